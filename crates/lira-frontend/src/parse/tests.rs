use lira_common::lir::{BinOp, BlockId, Condition, Opcode, Physical, Register, ValueKind, Virtual};

use crate::parse as parse_source;

const SUM: &str = "
# adds the numbers below v0
method sum {
  fixed v0 = a0
entry:
  v1 = const 0
  v2 = const 1
  jump loop
loop:
  v1 = add v1, v0
  v0 = sub v0, v2
  branch gt v0, v2 -> loop, done
done:
  a0 = move v1
  ret
}
";

fn messages(src: &str) -> Vec<String> {
    match parse_source(src) {
        Ok(_) => panic!("expected errors"),
        Err(errors) => errors.into_iter().map(|e| e.message).collect(),
    }
}

#[test]
fn parse_method_with_loop() {
    let methods = parse_source(SUM).unwrap();
    assert_eq!(1, methods.len());

    let method = &methods[0];
    assert_eq!("sum", method.name);
    assert_eq!(3, method.blocks.len());
    assert_eq!(Some(&Physical(0)), method.fixed.get(&0));

    let lp = method.names.lookup("loop").unwrap();
    let done = method.names.lookup("done").unwrap();
    assert_eq!(BlockId(1), lp);
    assert_eq!(vec![lp, done], method.get(&lp).succs);
    assert_eq!(vec![BlockId(0), lp], method.get(&lp).preds);

    let add = &method.get(&lp).insts[0];
    assert_eq!(3, add.id);
    assert_eq!(Opcode::Binary(BinOp::Add), add.opcode);
    assert_eq!(Some(Register::Virtual(Virtual::new(1))), add.write);

    let branch = method.get(&lp).terminator().unwrap();
    assert_eq!(Opcode::Branch(Condition::Greater, lp, done), branch.opcode);
}

#[test]
fn parse_several_methods() {
    let src = "
method first {
  ret
}

method second {
  v0 = local 7
  a0 = move v0
  ret
}
";

    let methods = parse_source(src).unwrap();
    assert_eq!(
        vec!["first", "second"],
        methods.iter().map(|m| m.name.as_str()).collect::<Vec<_>>()
    );
    assert_eq!(Opcode::Local(7), methods[1].blocks[0].insts[0].opcode);
}

#[test]
fn parse_value_kinds() {
    let src = "
method refs {
  call alloc
  v0.ref = local 0
  v1.ref = move v0.ref
  ret
}
";

    let methods = parse_source(src).unwrap();
    let inst = &methods[0].blocks[0].insts[2];
    assert_eq!(
        vec![Register::Virtual(Virtual::new(0).with_kind(ValueKind::Ref))],
        inst.reads
    );
}

#[test]
fn errors_are_collected_per_line() {
    let src = "
method broken {
  v0 = frobnicate v1
  v1 = const 1
  v2 = add v1
  ret
}
";

    let errors = messages(src);
    assert_eq!(2, errors.len());
    assert_eq!("unknown instruction `frobnicate`", errors[0]);
    assert_eq!("expected `,`, found end of line", errors[1]);
}

#[test]
fn spill_code_is_not_accepted() {
    let errors = messages("method m {\n  v0 = load v1\n  ret\n}\n");
    assert_eq!(vec!["`load` is reserved for spill code".to_string()], errors);
}

#[test]
fn allocatable_registers_are_not_accepted() {
    let errors = messages("method m {\n  t0 = const 1\n  ret\n}\n");
    assert_eq!(
        vec!["`t0` is reserved for the register allocator".to_string()],
        errors
    );
}

#[test]
fn destinations_are_checked() {
    let errors = messages("method m {\n  const 1\n  v0 = ret\n}\n");
    assert_eq!(
        vec![
            "`const` needs a destination register".to_string(),
            "`ret` does not produce a value".to_string(),
        ],
        errors
    );
}

#[test]
fn build_errors_cover_the_method() {
    let src = "method m {\n  jump nowhere\n}";
    let errors = parse_source(src).unwrap_err();

    assert_eq!(1, errors.len());
    assert_eq!(0..src.len(), errors[0].span);
    assert_eq!(
        "block `nowhere` is referenced but never defined",
        errors[0].message
    );
}

#[test]
fn unclosed_method() {
    let errors = messages("method m {\n  ret\n");
    assert_eq!(vec!["unclosed method body".to_string()], errors);
}

#[test]
fn errors_display_their_position() {
    let errors = parse_source("method m {\n  t0 = const 1\n  ret\n}\n").unwrap_err();
    assert_eq!(
        "`t0` is reserved for the register allocator (at 13..15)",
        errors[0].to_string()
    );
}

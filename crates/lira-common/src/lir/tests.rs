use super::{
    BinOp, BlockId, BuildError, Condition, Instruction, MethodBuilder, Opcode, Physical, Prettier,
    Register, Slot, ValueKind, Virtual,
};

fn v(id: usize) -> Register {
    Register::Virtual(Virtual::new(id))
}

#[test]
fn builder_renumbers_blocks_in_program_order() {
    let mut builder = MethodBuilder::new("main");
    let exit = builder.label("exit");
    assert_eq!(BlockId(0), exit);

    builder.start("entry");
    builder.push(Opcode::Const(1), [], Some(v(0)));
    builder.push(Opcode::Jump(exit), [], None);
    builder.start("exit");
    builder.push(Opcode::Move, [v(0)], Some(Register::Physical(Physical(0))));
    builder.push(Opcode::Return, [], None);

    let method = builder.build().unwrap();

    assert_eq!(Some(BlockId(0)), method.names.lookup("entry"));
    assert_eq!(Some(BlockId(1)), method.names.lookup("exit"));
    assert_eq!(Opcode::Jump(BlockId(1)), method.blocks[0].insts[1].opcode);
    assert_eq!(vec![BlockId(1)], method.blocks[0].succs);
    assert_eq!(vec![BlockId(0)], method.blocks[1].preds);
    assert_eq!(1, method.virtual_count());
}

#[test]
fn blocks_without_terminator_fall_through() {
    let mut builder = MethodBuilder::new("main");
    builder.start("a");
    builder.push(Opcode::Const(1), [], Some(v(0)));
    builder.start("b");
    builder.push(Opcode::Const(2), [], Some(v(1)));

    let method = builder.build().unwrap();

    assert_eq!(vec![BlockId(1)], method.blocks[0].succs);
    assert!(method.blocks[1].succs.is_empty());
    assert_eq!(Some(BlockId(1)), method.block_at(1));
    assert_eq!(None, method.block_at(7));
}

#[test]
fn undefined_labels_are_rejected() {
    let mut builder = MethodBuilder::new("main");
    let nowhere = builder.label("nowhere");
    builder.start("entry");
    builder.push(Opcode::Jump(nowhere), [], None);

    assert_eq!(
        Err(BuildError::UndefinedLabel("nowhere".into())),
        builder.build().map(|_| ())
    );
}

#[test]
fn instructions_read_at_most_two_registers() {
    let mut builder = MethodBuilder::new("main");
    builder.push(Opcode::Binary(BinOp::Add), [v(0), v(1), v(2)], Some(v(3)));

    assert_eq!(
        Err(BuildError::TooManyReads { id: 0, count: 3 }),
        builder.build().map(|_| ())
    );
}

#[test]
fn precoloring_is_limited_to_argument_registers() {
    let mut builder = MethodBuilder::new("main");
    builder.push(Opcode::Const(1), [], Some(v(0)));
    builder.fix(0, Physical::by_name("t3").unwrap());

    assert!(matches!(
        builder.build(),
        Err(BuildError::InvalidPrecolor { .. })
    ));
}

#[test]
fn value_kinds_must_agree() {
    let reference = Register::Virtual(Virtual::new(0).with_kind(ValueKind::Ref));
    let mut builder = MethodBuilder::new("main");
    builder.push(Opcode::Const(1), [], Some(v(0)));
    builder.push(Opcode::Move, [reference], Some(v(1)));

    assert_eq!(
        Err(BuildError::ConflictingKinds(0)),
        builder.build().map(|_| ())
    );
}

#[test]
fn split_edge_redirects_branch() {
    let mut builder = MethodBuilder::new("main");
    let (left, right) = (builder.label("left"), builder.label("right"));
    builder.start("entry");
    builder.push(Opcode::Const(0), [], Some(v(0)));
    builder.push(
        Opcode::Branch(Condition::Equal, left, right),
        [v(0), v(0)],
        None,
    );
    builder.start("left");
    builder.push(Opcode::Return, [], None);
    builder.start("right");
    builder.push(Opcode::Return, [], None);

    let mut method = builder.build().unwrap();
    let right = method.names.lookup("right").unwrap();
    let load = Instruction::load(1, Slot::Stack(0), Physical::by_name("t0").unwrap());
    let middle = method.split_edge(method.entry(), right, vec![load]);

    assert_eq!(vec![method.entry()], method.get(&middle).preds);
    assert_eq!(vec![right], method.get(&middle).succs);
    assert!(method.get(&method.entry()).succs.contains(&middle));
    assert_eq!(vec![middle], method.get(&right).preds);
    assert_eq!(Opcode::Jump(right), method.get(&middle).insts[1].opcode);
}

#[test]
fn pretty_prints_labels() {
    let mut builder = MethodBuilder::new("main");
    let exit = builder.label("exit");
    builder.start("entry");
    builder.push(Opcode::Local(0), [], Some(v(0)));
    builder.push(Opcode::Jump(exit), [], None);
    builder.start("exit");
    builder.push(Opcode::Binary(BinOp::Add), [v(0), v(0)], Some(v(1)));
    builder.push(Opcode::Return, [], None);
    builder.fix(0, Physical(0));

    let method = builder.build().unwrap();
    let expected = "method main {
  fixed v0 = a0
entry:
  v0 = local 0
  jump exit
exit:
  v1 = add v0, v0
  ret
}";

    assert_eq!(expected, Prettier::new(&method).pretty_method());
}

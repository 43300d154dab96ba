use super::emit;
use crate::alloc::{allocate, Config, Strategy};

fn assemble(src: &str, registers: usize) -> String {
    let method = lira_frontend::parse(src).unwrap().remove(0);
    let allocation = allocate(&method, &Config::new(Strategy::Linear, registers)).unwrap();
    emit(&allocation)
}

#[test]
fn spill_code_and_frame() {
    let src = "
method reversed {
  v0 = const 1
  v1 = const 2
  v2 = const 3
  a0 = move v2
  a1 = move v1
  a2 = move v0
  ret
}";

    let expected = "reversed:
    push fp
    mov fp, sp
    push t0
    sub sp, 16
.reversed.entry:
    mov t0, 1
    store t0, [sp+0]
    mov t0, 2
    store t0, [sp+8]
    mov t0, 3
    mov a0, t0
    load t0, [sp+8]
    mov a1, t0
    load t0, [sp+0]
    mov a2, t0
    add sp, 16
    pop t0
    pop fp
    ret
";

    assert_eq!(expected, assemble(src, 1));
}

#[test]
fn loops_and_branches() {
    let src = "
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
}";

    let expected = "sum:
    push fp
    mov fp, sp
    push t0
    push t1
.sum.entry:
    mov t0, 0
    mov t1, 1
    jmp .sum.loop
.sum.loop:
    add t0, t0, a0
    sub a0, a0, t1
    bgt a0, t1, .sum.loop
    jmp .sum.done
.sum.done:
    mov a0, t0
    pop t1
    pop t0
    pop fp
    ret
";

    assert_eq!(expected, assemble(src, 18));
}

#[test]
fn parameters_come_from_registers_and_the_caller_frame() {
    let src = "
method params {
  v0 = local 1
  v1 = local 6
  v2 = local 8
  v3 = add v0, v1
  v3 = add v3, v2
  call log
  a0 = move v3
  ret
}";

    let asm = assemble(src, 18);
    let lines: Vec<&str> = asm.lines().map(str::trim).collect();

    assert!(lines.contains(&"mov t0, a1"));
    assert!(lines.contains(&"load t1, [fp+16]"));
    assert!(lines.contains(&"load t2, [fp+32]"));
    assert!(lines.contains(&"call log"));
}

#[test]
fn falling_off_the_end_returns() {
    let src = "
method tail {
  v0 = const 1
  a0 = move v0
}";

    let expected = "tail:
    push fp
    mov fp, sp
    push t0
.tail.entry:
    mov t0, 1
    mov a0, t0
    pop t0
    pop fp
    ret
";

    assert_eq!(expected, assemble(src, 4));
}

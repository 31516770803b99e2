//! Unit tests for assembly emission.

use crate::{
    ast::{
        ast::{
            ClassDecl, ClassMember, CompilationUnit, FuncDecl, Modifier, ParamDecl, VarDecl,
            VarDeclarator,
        },
        expressions::{BinaryOperator, Expr},
        statements::{Block, Stmt},
        types::{TypeNode, TypeRef},
    },
    compile,
    config::CompileOptions,
    errors::errors::InternalError,
    symbols::symbol_table::{SymbolDetails, SymbolTable},
    Position,
};

use super::assembly_types::{assembly_type, quote_name, string_literal};

fn method(
    name: &str,
    modifiers: &[Modifier],
    return_type: TypeNode,
    parameters: Vec<ParamDecl>,
    body: Vec<Stmt>,
) -> ClassMember {
    ClassMember::Method(FuncDecl::new(
        name,
        modifiers,
        return_type,
        parameters,
        Block::new(body),
    ))
}

fn run_method(body: Vec<Stmt>) -> ClassMember {
    method("run", &[Modifier::Public, Modifier::Static], TypeNode::void(), vec![], body)
}

fn main_class(members: Vec<ClassMember>) -> CompilationUnit {
    CompilationUnit::new(ClassDecl::new("Main", &[Modifier::Public], members))
}

fn assemble_with(unit: &CompilationUnit, options: &CompileOptions) -> String {
    let output = compile(unit, options).unwrap();
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    output.assembly.unwrap()
}

fn assemble(unit: &CompilationUnit) -> String {
    assemble_with(unit, &CompileOptions::default())
}

/// Trimmed, non-empty lines of the output.
fn lines(assembly: &str) -> Vec<&str> {
    assembly
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Asserts that `expected` appear in order as consecutive lines.
fn assert_sequence(assembly: &str, expected: &[&str]) {
    let lines = lines(assembly);
    let found = lines
        .windows(expected.len())
        .any(|window| window == expected);
    assert!(found, "{:?} not found in:\n{}", expected, assembly);
}

#[test]
fn test_hello_world() {
    let unit = main_class(vec![run_method(vec![Stmt::expr(Expr::call(
        "System.Write",
        vec![Expr::string("hi")],
    ))])]);
    let assembly = assemble(&unit);

    assert_sequence(
        &assembly,
        &[
            ".assembly extern mscorlib {}",
            ".assembly program {}",
            ".module program.exe",
            ".class public auto ansi beforefieldinit Main extends [mscorlib]System.Object",
            "{",
            ".method public hidebysig static void run() cil managed",
            "{",
            ".entrypoint",
            ".maxstack 8",
            "ldstr \"hi\"",
            "call void [mscorlib]System.Console::Write(string)",
            "ret",
            "}",
        ],
    );
    assert_eq!(assembly.matches(".class").count(), 1);
    assert_eq!(assembly.matches(".entrypoint").count(), 1);
}

#[test]
fn test_locals_and_arithmetic() {
    let unit = main_class(vec![run_method(vec![
        Stmt::local(VarDecl::new(
            TypeNode::int(),
            vec![VarDeclarator::new(
                "x",
                Some(Expr::binary(Expr::int(1), BinaryOperator::Add, Expr::int(2))),
            )],
        )),
        Stmt::expr(Expr::call("System.WriteLine", vec![Expr::name("x")])),
    ])]);
    let assembly = assemble(&unit);

    assert_sequence(
        &assembly,
        &[
            ".maxstack 8",
            ".locals init ([0] int32 x)",
            "ldc.i4 1",
            "ldc.i4 2",
            "add",
            "stloc 0",
            "ldloc 0",
            "call void [mscorlib]System.Console::WriteLine(int32)",
            "ret",
        ],
    );
}

#[test]
fn test_if_else_branches() {
    let unit = main_class(vec![run_method(vec![Stmt::if_(
        Expr::binary(Expr::int(1), BinaryOperator::LessEqual, Expr::int(2)),
        Stmt::expr(Expr::call("System.Write", vec![Expr::string("yes")])),
        Some(Stmt::expr(Expr::call("System.Write", vec![Expr::string("no")]))),
    )])]);
    let assembly = assemble(&unit);

    assert_sequence(
        &assembly,
        &[
            "ldc.i4 1",
            "ldc.i4 2",
            "cgt",
            "ldc.i4.0",
            "ceq",
            "brfalse ELSE_1",
            "ldstr \"yes\"",
            "call void [mscorlib]System.Console::Write(string)",
            "br END_IF_0",
            "ELSE_1:",
            "ldstr \"no\"",
            "call void [mscorlib]System.Console::Write(string)",
            "END_IF_0:",
            "ret",
        ],
    );
}

#[test]
fn test_while_loop() {
    let unit = main_class(vec![run_method(vec![
        Stmt::local(VarDecl::new(
            TypeNode::int(),
            vec![VarDeclarator::new("i", Some(Expr::int(0)))],
        )),
        Stmt::while_(
            Expr::binary(Expr::name("i"), BinaryOperator::Less, Expr::int(3)),
            Stmt::expr(Expr::assign(
                Expr::name("i"),
                Expr::binary(Expr::name("i"), BinaryOperator::Add, Expr::int(1)),
            )),
        ),
    ])]);
    let assembly = assemble(&unit);

    assert_sequence(
        &assembly,
        &[
            "stloc 0",
            "LOOP_0:",
            "ldloc 0",
            "ldc.i4 3",
            "clt",
            "brfalse END_LOOP_1",
            "ldloc 0",
            "ldc.i4 1",
            "add",
            "stloc 0",
            "br LOOP_0",
            "END_LOOP_1:",
            "ret",
        ],
    );
}

#[test]
fn test_static_calls_and_parameters() {
    let unit = main_class(vec![
        run_method(vec![
            Stmt::expr(Expr::call(
                "System.WriteLine",
                vec![Expr::call("sum", vec![Expr::int(1), Expr::int(2)])],
            )),
            Stmt::expr(Expr::call("sum", vec![Expr::int(3), Expr::int(4)])),
        ]),
        method(
            "sum",
            &[Modifier::Private, Modifier::Static],
            TypeNode::int(),
            vec![
                ParamDecl::new("a", TypeNode::int()),
                ParamDecl::new("b", TypeNode::int()),
            ],
            vec![Stmt::return_(Some(Expr::binary(
                Expr::name("a"),
                BinaryOperator::Add,
                Expr::name("b"),
            )))],
        ),
    ]);
    let assembly = assemble(&unit);

    assert_sequence(
        &assembly,
        &[
            "ldc.i4 1",
            "ldc.i4 2",
            "call int32 Main::sum(int32, int32)",
            "call void [mscorlib]System.Console::WriteLine(int32)",
            "ldc.i4 3",
            "ldc.i4 4",
            "call int32 Main::sum(int32, int32)",
            "pop",
            "ret",
        ],
    );
    assert_sequence(
        &assembly,
        &[
            ".method private hidebysig static int32 sum(int32 a, int32 b) cil managed",
            "{",
            ".maxstack 8",
            "ldarg 0",
            "ldarg 1",
            "add",
            "ret",
            "ret",
            "}",
        ],
    );
}

#[test]
fn test_fields_instance_methods_and_construction() {
    let unit = main_class(vec![
        ClassMember::Field(VarDecl::single(TypeNode::int(), "count")),
        ClassMember::Field(
            VarDecl::single(TypeNode::string(), "label")
                .with_modifiers(&[Modifier::Public, Modifier::Static]),
        ),
        run_method(vec![
            Stmt::local(VarDecl::new(
                TypeNode::named("Main"),
                vec![VarDeclarator::new("m", Some(Expr::new_object("Main", vec![])))],
            )),
            Stmt::expr(Expr::assign(Expr::name("label"), Expr::string("main"))),
        ]),
        method(
            "set",
            &[Modifier::Public],
            TypeNode::void(),
            vec![ParamDecl::new("v", TypeNode::int())],
            vec![
                Stmt::expr(Expr::assign(Expr::name("count"), Expr::name("v"))),
                Stmt::expr(Expr::call("bump", vec![])),
            ],
        ),
        method("bump", &[], TypeNode::void(), vec![], vec![]),
    ]);
    let assembly = assemble(&unit);

    assert_sequence(
        &assembly,
        &[
            "{",
            ".field private int32 count",
            ".field public static string label",
        ],
    );
    assert_sequence(
        &assembly,
        &[
            ".locals init ([0] class Main m)",
            "newobj instance void Main::.ctor()",
            "stloc 0",
            "ldstr \"main\"",
            "stsfld string Main::label",
            "ret",
        ],
    );
    assert_sequence(
        &assembly,
        &[
            ".method public hidebysig instance void set(int32 v) cil managed",
            "{",
            ".maxstack 8",
            "ldarg.0",
            "ldarg 1",
            "stfld int32 Main::count",
            "ldarg.0",
            "call instance void Main::bump()",
            "ret",
        ],
    );
    assert_sequence(
        &assembly,
        &[
            ".method public hidebysig specialname rtspecialname instance void .ctor() cil managed",
            "{",
            ".maxstack 8",
            "ldarg.0",
            "call instance void [mscorlib]System.Object::.ctor()",
            "ret",
            "}",
        ],
    );
}

#[test]
fn test_string_operators() {
    let unit = main_class(vec![run_method(vec![
        Stmt::local(VarDecl::new(
            TypeNode::string(),
            vec![VarDeclarator::new(
                "s",
                Some(Expr::binary(Expr::string("a"), BinaryOperator::Add, Expr::string("b"))),
            )],
        )),
        Stmt::local(VarDecl::new(
            TypeNode::boolean(),
            vec![VarDeclarator::new(
                "same",
                Some(Expr::binary(Expr::name("s"), BinaryOperator::Equal, Expr::string("ab"))),
            )],
        )),
    ])]);
    let assembly = assemble(&unit);

    assert_sequence(
        &assembly,
        &[
            ".locals init ([0] string s, [1] bool same)",
            "ldstr \"a\"",
            "ldstr \"b\"",
            "call string [mscorlib]System.String::Concat(string, string)",
            "stloc 0",
            "ldloc 0",
            "ldstr \"ab\"",
            "call bool [mscorlib]System.String::op_Equality(string, string)",
            "stloc 1",
        ],
    );
}

#[test]
fn test_nested_and_static_classes() {
    let unit = CompilationUnit::new(ClassDecl::new(
        "Main",
        &[Modifier::Public, Modifier::Static],
        vec![
            run_method(vec![]),
            ClassMember::Class(ClassDecl::new("Inner", &[], vec![])),
        ],
    ));
    let assembly = assemble(&unit);

    assert!(assembly.contains(concat!(
        ".class public abstract sealed auto ansi beforefieldinit Main ",
        "extends [mscorlib]System.Object"
    )));
    assert!(assembly.contains(
        ".class nested private auto ansi beforefieldinit Inner extends [mscorlib]System.Object"
    ));
    // Only the nested class gets a constructor.
    assert_eq!(assembly.matches(".ctor() cil managed").count(), 1);
}

#[test]
fn test_named_entry_point_and_options() {
    let unit = main_class(vec![
        run_method(vec![]),
        method("start", &[Modifier::Public], TypeNode::void(), vec![], vec![]),
    ]);
    let options = CompileOptions {
        assembly_name: String::from("hello"),
        max_stack: 4,
        ..CompileOptions::default()
    }
    .with_entry_point("start");
    let assembly = assemble_with(&unit, &options);

    assert!(assembly.contains(".assembly hello {}"));
    assert!(assembly.contains(".module hello.exe"));
    assert_sequence(
        &assembly,
        &[
            ".method public hidebysig static void start() cil managed",
            "{",
            ".entrypoint",
            ".maxstack 4",
            "ret",
        ],
    );
    assert_eq!(assembly.matches(".entrypoint").count(), 1);
}

#[test]
fn test_named_instance_entry_point_uses_static_convention() {
    let unit = main_class(vec![
        method("start", &[Modifier::Public], TypeNode::void(), vec![], vec![]),
        method(
            "other",
            &[Modifier::Public],
            TypeNode::void(),
            vec![],
            vec![Stmt::expr(Expr::call("start", vec![]))],
        ),
    ]);
    let options = CompileOptions::default().with_entry_point("start");
    let assembly = assemble_with(&unit, &options);

    assert_sequence(
        &assembly,
        &[
            ".method public hidebysig instance void other() cil managed",
            "{",
            ".maxstack 8",
            "call void Main::start()",
            "ret",
        ],
    );
}

#[test]
fn test_named_instance_entry_point_reading_a_field_is_a_diagnostic() {
    let unit = main_class(vec![
        ClassMember::Field(VarDecl::single(TypeNode::int(), "count")),
        method(
            "start",
            &[Modifier::Public],
            TypeNode::void(),
            vec![],
            vec![Stmt::expr(Expr::assign(Expr::name("count"), Expr::int(1)))],
        ),
    ]);
    let options = CompileOptions::default().with_entry_point("start");
    let output = compile(&unit, &options).unwrap();

    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(
        output.diagnostics.errors()[0].get_error_name(),
        "InconsistentModifiers"
    );
    assert!(output.assembly.is_none());
}

#[test]
fn test_no_assembly_when_diagnostics_exist() {
    let unit = main_class(vec![run_method(vec![Stmt::expr(Expr::name("missing"))])]);
    let output = compile(&unit, &CompileOptions::default()).unwrap();
    assert_eq!(output.diagnostics.len(), 1);
    assert!(output.assembly.is_none());
    assert!(!output.is_success());
}

#[test]
fn test_quote_name() {
    assert_eq!(quote_name("run"), "run");
    assert_eq!(quote_name("_value2"), "_value2");
    assert_eq!(quote_name("add"), "'add'");
    assert_eq!(quote_name("my var"), "'my var'");
    assert_eq!(quote_name("it's"), "'it\\'s'");
}

#[test]
fn test_reserved_method_name_is_quoted() {
    let unit = main_class(vec![
        run_method(vec![Stmt::expr(Expr::call("add", vec![]))]),
        method("add", &[Modifier::Static], TypeNode::void(), vec![], vec![]),
    ]);
    let assembly = assemble(&unit);
    assert!(assembly.contains(".method private hidebysig static void 'add'() cil managed"));
    assert!(assembly.contains("call void Main::'add'()"));
}

#[test]
fn test_string_literal_escapes() {
    assert_eq!(string_literal("hi"), "\"hi\"");
    assert_eq!(string_literal("a\"b\n"), "\"a\\\"b\\n\"");
}

#[test]
fn test_assembly_types() {
    assert_eq!(assembly_type(&TypeRef::Int).unwrap(), "int32");
    assert_eq!(assembly_type(&TypeRef::Boolean).unwrap(), "bool");
    assert_eq!(assembly_type(&TypeRef::This).unwrap(), "object");

    let mut table = SymbolTable::new();
    let inner = table.create_symbol(
        "Inner",
        SymbolDetails::Class {
            path: vec![String::from("Main"), String::from("Inner")],
            modifiers: vec![],
            builtin: false,
        },
        None,
        Position::null(),
    );
    assert_eq!(
        assembly_type(&TypeRef::Class(inner)).unwrap(),
        "class Main/Inner"
    );

    for unsupported in [TypeRef::Null, TypeRef::Error, TypeRef::Declaration] {
        assert!(matches!(
            assembly_type(&unsupported),
            Err(InternalError::UnsupportedAssemblyType { .. })
        ));
    }
}

#[test]
fn test_generation_is_deterministic() {
    let build = || {
        main_class(vec![
            run_method(vec![
                Stmt::local(VarDecl::single(TypeNode::int(), "x")),
                Stmt::if_(
                    Expr::boolean(true),
                    Stmt::expr(Expr::assign(Expr::name("x"), Expr::int(1))),
                    None,
                ),
                Stmt::expr(Expr::call("System.WriteLine", vec![Expr::name("x")])),
            ]),
            ClassMember::Class(ClassDecl::new("Inner", &[Modifier::Public], vec![])),
        ])
    };
    assert_eq!(assemble(&build()), assemble(&build()));
}

pub mod lexer;
pub mod parser;

pub use parser::{
    ColumnRef, Condition, Connective, Delete, Insert, Operand, Parser, QueryKind, Select, Stmt,
    classify,
};

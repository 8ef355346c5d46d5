use crate::expr::{
    AssignData, BinaryData, CallData, Expr, ExprVisitor, GetData, GroupingData, LogicalData,
    SetData, SuperData, ThisData, UnaryData, VariableData,
};
use crate::literal::Literal;
use crate::stmt::{
    BlockData, ClassData, ExpressionData, FunctionData, IfData, PrintData, ReturnData, Stmt,
    StmtVisitor, VarData, WhileData,
};

/// Returns a string representation of the expression in paranthesize.
macro_rules! parenthesize {
    ( $self:ident, $name:expr, $( $x:expr ),+ ) => {
        {
            let mut string = String::new();
            string += "(";
            string += $name;
            $(
                string += " ";
                string += &$x.accept($self);
            )*
            string += ")";

            string
        }
    };
}

/// Renders an `Expr`/`Stmt` tree back to Lox-like source text, used by tests
/// to check that a round-tripped parse produces an equivalent tree.
pub struct ASTPrinter;

impl ASTPrinter {
    pub fn print(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    pub fn print_stmt(&mut self, stmt: &Stmt) -> String {
        stmt.accept(self)
    }
}

impl ExprVisitor<String> for ASTPrinter {
    fn visit_literal_expr(&mut self, literal: &Literal) -> String {
        literal.to_string()
    }

    fn visit_logical_expr(&mut self, logical: &LogicalData) -> String {
        parenthesize!(self, &logical.operator.lexeme, &logical.left, &logical.right)
    }

    fn visit_unary_expr(&mut self, unary: &UnaryData) -> String {
        parenthesize!(self, &unary.operator.lexeme, &unary.expr)
    }

    fn visit_binary_expr(&mut self, binary: &BinaryData) -> String {
        parenthesize!(self, &binary.operator.lexeme, &binary.left, &binary.right)
    }

    fn visit_grouping_expr(&mut self, grouping: &GroupingData) -> String {
        parenthesize!(self, "group", grouping.expr)
    }

    fn visit_variable_expr(&mut self, variable: &VariableData) -> String {
        variable.name.lexeme.clone()
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) -> String {
        parenthesize!(self, format!("= {}", &assign.name.lexeme).as_str(), assign.value)
    }

    fn visit_call_expr(&mut self, call: &CallData) -> String {
        let mut string = String::new();
        string += &call.callee.accept(self);
        string += "(";
        for arg in &call.arguments {
            string += &arg.accept(self);
            string += " ";
        }
        string = string.trim_end().to_string();
        string += ")";
        string
    }

    fn visit_get_expr(&mut self, get: &GetData) -> String {
        parenthesize!(self, format!(". {}", &get.name.lexeme).as_str(), get.object)
    }

    fn visit_set_expr(&mut self, set: &SetData) -> String {
        let mut string = String::new();
        string += "(= ";
        string += &set.object.accept(self);
        string += ".";
        string += &set.name.lexeme;
        string += " ";
        string += &set.value.accept(self);
        string += ")";
        string
    }

    fn visit_this_expr(&mut self, _: &ThisData) -> String {
        "this".to_string()
    }

    fn visit_super_expr(&mut self, super_: &SuperData) -> String {
        format!("(super.{})", super_.method.lexeme)
    }
}

impl StmtVisitor<String> for ASTPrinter {
    fn visit_expression_stmt(&mut self, stmt: &ExpressionData) -> String {
        parenthesize!(self, "expr", stmt.expr)
    }

    fn visit_print_stmt(&mut self, stmt: &PrintData) -> String {
        parenthesize!(self, "print", stmt.expr)
    }

    fn visit_var_stmt(&mut self, stmt: &VarData) -> String {
        let mut string = String::new();
        string += "(var ";
        string += &stmt.name.lexeme;
        if let Some(initializer) = &stmt.initializer {
            string += " = ";
            string += &initializer.accept(self);
        }
        string += ")";
        string
    }

    fn visit_block_stmt(&mut self, stmt: &BlockData) -> String {
        let mut string = String::new();
        string += "{";
        for stmt in &stmt.statements {
            string += " ";
            string += &stmt.accept(self);
        }
        string += " }";
        string
    }

    fn visit_if_stmt(&mut self, stmt: &IfData) -> String {
        let mut string = String::new();
        string += "(if ";
        string += &stmt.condition.accept(self);
        string += " ";
        string += &stmt.then_branch.accept(self);
        if let Some(else_branch) = &stmt.else_branch {
            string += " else ";
            string += &else_branch.accept(self);
        }
        string += ")";
        string
    }

    fn visit_while_stmt(&mut self, stmt: &WhileData) -> String {
        parenthesize!(self, "while", stmt.condition, stmt.body)
    }

    fn visit_function_stmt(&mut self, stmt: &FunctionData) -> String {
        let mut string = String::new();
        string += "(fun ";
        string += &stmt.name.lexeme;
        string += "(";
        for param in &stmt.params {
            string += &param.lexeme;
            string += " ";
        }
        string = string.trim_end().to_string();
        string += ") { ";
        string += &stmt.body.iter().map(|s| s.accept(self)).collect::<Vec<String>>().join(" ");
        string += " })";
        string
    }

    fn visit_return_stmt(&mut self, stmt: &ReturnData) -> String {
        match &stmt.value {
            Some(value) => parenthesize!(self, "return", value),
            None => "(return)".to_string(),
        }
    }

    fn visit_class_stmt(&mut self, stmt: &ClassData) -> String {
        let mut string = String::new();
        string += "(class ";
        string += &stmt.name.lexeme;
        string += " { ";
        string += &stmt
            .methods
            .iter()
            .map(|m| self.visit_function_stmt(m))
            .collect::<Vec<String>>()
            .join(" ");
        string += " })";
        string
    }
}

/// Renders an `Expr`/`Stmt` tree back into valid Lox source, fully
/// parenthesizing every compound expression so the result parses
/// unambiguously regardless of operator precedence. Unlike `ASTPrinter`,
/// which is a Lisp-style debugging aid, this output can be fed back through
/// the scanner and parser: used to check that parsing is idempotent.
pub struct Unparser;

impl Unparser {
    pub fn unparse_stmt(&mut self, stmt: &Stmt) -> String {
        stmt.accept(self)
    }
}

impl ExprVisitor<String> for Unparser {
    fn visit_literal_expr(&mut self, literal: &Literal) -> String {
        match literal {
            Literal::String(s) => format!("\"{s}\""),
            other => other.to_string(),
        }
    }

    fn visit_logical_expr(&mut self, logical: &LogicalData) -> String {
        format!("({} {} {})", logical.left.accept(self), logical.operator.lexeme, logical.right.accept(self))
    }

    fn visit_unary_expr(&mut self, unary: &UnaryData) -> String {
        format!("({}{})", unary.operator.lexeme, unary.expr.accept(self))
    }

    fn visit_binary_expr(&mut self, binary: &BinaryData) -> String {
        format!("({} {} {})", binary.left.accept(self), binary.operator.lexeme, binary.right.accept(self))
    }

    fn visit_grouping_expr(&mut self, grouping: &GroupingData) -> String {
        format!("({})", grouping.expr.accept(self))
    }

    fn visit_variable_expr(&mut self, variable: &VariableData) -> String {
        variable.name.lexeme.clone()
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) -> String {
        format!("({} = {})", assign.name.lexeme, assign.value.accept(self))
    }

    fn visit_call_expr(&mut self, call: &CallData) -> String {
        let args = call.arguments.iter().map(|a| a.accept(self)).collect::<Vec<_>>().join(", ");
        format!("{}({})", call.callee.accept(self), args)
    }

    fn visit_get_expr(&mut self, get: &GetData) -> String {
        format!("{}.{}", get.object.accept(self), get.name.lexeme)
    }

    fn visit_set_expr(&mut self, set: &SetData) -> String {
        format!("({}.{} = {})", set.object.accept(self), set.name.lexeme, set.value.accept(self))
    }

    fn visit_this_expr(&mut self, _: &ThisData) -> String {
        "this".to_string()
    }

    fn visit_super_expr(&mut self, super_: &SuperData) -> String {
        format!("super.{}", super_.method.lexeme)
    }
}

impl StmtVisitor<String> for Unparser {
    fn visit_expression_stmt(&mut self, stmt: &ExpressionData) -> String {
        format!("{};", stmt.expr.accept(self))
    }

    fn visit_print_stmt(&mut self, stmt: &PrintData) -> String {
        format!("print {};", stmt.expr.accept(self))
    }

    fn visit_var_stmt(&mut self, stmt: &VarData) -> String {
        match &stmt.initializer {
            Some(initializer) => format!("var {} = {};", stmt.name.lexeme, initializer.accept(self)),
            None => format!("var {};", stmt.name.lexeme),
        }
    }

    fn visit_block_stmt(&mut self, stmt: &BlockData) -> String {
        let body = stmt.statements.iter().map(|s| s.accept(self)).collect::<Vec<_>>().join(" ");
        format!("{{ {body} }}")
    }

    fn visit_if_stmt(&mut self, stmt: &IfData) -> String {
        let mut string = format!("if ({}) {}", stmt.condition.accept(self), stmt.then_branch.accept(self));
        if let Some(else_branch) = &stmt.else_branch {
            string += &format!(" else {}", else_branch.accept(self));
        }
        string
    }

    fn visit_while_stmt(&mut self, stmt: &WhileData) -> String {
        format!("while ({}) {}", stmt.condition.accept(self), stmt.body.accept(self))
    }

    fn visit_function_stmt(&mut self, stmt: &FunctionData) -> String {
        format!("fun {}", self.unparse_method(stmt))
    }

    fn visit_return_stmt(&mut self, stmt: &ReturnData) -> String {
        match &stmt.value {
            Some(value) => format!("return {};", value.accept(self)),
            None => "return;".to_string(),
        }
    }

    fn visit_class_stmt(&mut self, stmt: &ClassData) -> String {
        let methods = stmt.methods.iter().map(|m| self.unparse_method(m)).collect::<Vec<_>>().join(" ");
        format!("class {} {{ {} }}", stmt.name.lexeme, methods)
    }
}

impl Unparser {
    /// A method declaration minus the leading `fun` keyword, which the
    /// grammar only requires for top-level function declarations.
    fn unparse_method(&mut self, stmt: &FunctionData) -> String {
        let params = stmt.params.iter().map(|p| p.lexeme.clone()).collect::<Vec<_>>().join(", ");
        let body = stmt.body.iter().map(|s| s.accept(self)).collect::<Vec<_>>().join(" ");
        format!("{}({}) {{ {} }}", stmt.name.lexeme, params, body)
    }
}

/// Strips `Grouping` wrappers so a tree built from fully-parenthesized
/// unparsed text compares equal to the original tree, which only wraps an
/// expression in `Grouping` where the source actually wrote parens.
fn strip_groups(expr: &Expr) -> Expr {
    match expr {
        Expr::Grouping(data) => strip_groups(&data.expr),
        Expr::Literal(literal) => Expr::Literal(literal.clone()),
        Expr::Logical(data) => Expr::Logical(LogicalData {
            left: Box::new(strip_groups(&data.left)),
            operator: data.operator.clone(),
            right: Box::new(strip_groups(&data.right)),
        }),
        Expr::Unary(data) => {
            Expr::Unary(UnaryData { operator: data.operator.clone(), expr: Box::new(strip_groups(&data.expr)) })
        }
        Expr::Binary(data) => Expr::Binary(BinaryData {
            left: Box::new(strip_groups(&data.left)),
            operator: data.operator.clone(),
            right: Box::new(strip_groups(&data.right)),
        }),
        Expr::Variable(data) => Expr::Variable(data.clone()),
        Expr::Assign(data) => {
            Expr::Assign(AssignData { id: data.id, name: data.name.clone(), value: Box::new(strip_groups(&data.value)) })
        }
        Expr::Call(data) => Expr::Call(CallData {
            callee: Box::new(strip_groups(&data.callee)),
            paren: data.paren.clone(),
            arguments: data.arguments.iter().map(strip_groups).collect(),
        }),
        Expr::Get(data) => Expr::Get(GetData { object: Box::new(strip_groups(&data.object)), name: data.name.clone() }),
        Expr::Set(data) => Expr::Set(SetData {
            object: Box::new(strip_groups(&data.object)),
            name: data.name.clone(),
            value: Box::new(strip_groups(&data.value)),
        }),
        Expr::This(data) => Expr::This(data.clone()),
        Expr::Super(data) => Expr::Super(data.clone()),
    }
}

fn strip_groups_function(data: &FunctionData) -> FunctionData {
    FunctionData { name: data.name.clone(), params: data.params.clone(), body: data.body.iter().map(strip_groups_stmt).collect() }
}

fn strip_groups_stmt(stmt: &Stmt) -> Stmt {
    match stmt {
        Stmt::Expression(data) => Stmt::Expression(ExpressionData { expr: strip_groups(&data.expr) }),
        Stmt::Print(data) => Stmt::Print(PrintData { expr: strip_groups(&data.expr) }),
        Stmt::Var(data) => {
            Stmt::Var(VarData { name: data.name.clone(), initializer: data.initializer.as_ref().map(strip_groups) })
        }
        Stmt::Block(data) => Stmt::Block(BlockData { statements: data.statements.iter().map(strip_groups_stmt).collect() }),
        Stmt::If(data) => Stmt::If(IfData {
            condition: strip_groups(&data.condition),
            then_branch: Box::new(strip_groups_stmt(&data.then_branch)),
            else_branch: data.else_branch.as_ref().map(|branch| Box::new(strip_groups_stmt(branch))),
        }),
        Stmt::While(data) => {
            Stmt::While(WhileData { condition: strip_groups(&data.condition), body: Box::new(strip_groups_stmt(&data.body)) })
        }
        Stmt::Function(data) => Stmt::Function(strip_groups_function(data)),
        Stmt::Return(data) => Stmt::Return(ReturnData { keyword: data.keyword.clone(), value: data.value.as_ref().map(strip_groups) }),
        Stmt::Class(data) => Stmt::Class(ClassData {
            name: data.name.clone(),
            methods: data.methods.iter().map(strip_groups_function).collect(),
        }),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::Parser;
    use crate::scanner::Scanner;
    use crate::token::{Token, Type};

    fn parse(source: &str) -> Vec<Stmt> {
        crate::error::reset_error();
        let tokens = Scanner::new(source).scan_tokens();
        Parser::new(tokens).parse()
    }

    #[test]
    fn prints_binary_expression_as_lisp_like_string() {
        let expr = Expr::Binary(BinaryData {
            left: Box::new(Expr::Literal(Literal::Number(1.0))),
            operator: Token::new(Type::Plus, "+".into(), None, 1),
            right: Box::new(Expr::Literal(Literal::Number(2.0))),
        });
        assert_eq!(ASTPrinter.print(&expr), "(+ 1 2)");
    }

    #[test]
    fn prints_var_statement_with_initializer() {
        let stmt = Stmt::Var(VarData {
            name: Token::new(Type::Identifier, "a".into(), None, 1),
            initializer: Some(Expr::Literal(Literal::Nil)),
        });
        assert_eq!(ASTPrinter.print_stmt(&stmt), "(var a = nil)");
    }

    #[test]
    fn unparse_then_reparse_produces_a_structurally_identical_ast() {
        let source = "
            var a = 1 + 2 * 3;
            var b = (a - 1) / 2;
            if (a > b and !false) { print a; } else { print -b; }
            while (a > 0) { a = a - 1; }
            fun add(x, y) { return x + y; }
            class Greeter { greet(name) { print \"hi, \" + name; } }
        ";

        let original = parse(source);
        let printed = original.iter().map(|stmt| Unparser.unparse_stmt(stmt)).collect::<Vec<_>>().join(" ");
        let reparsed = parse(&printed);

        assert!(!crate::error::did_error());
        assert_eq!(
            original.iter().map(strip_groups_stmt).collect::<Vec<_>>(),
            reparsed.iter().map(strip_groups_stmt).collect::<Vec<_>>(),
        );
    }
}

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use crate::class::Class;
use crate::environment::Environment;
use crate::error::{Error, RuntimeError};
use crate::expr::*;
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::*;
use crate::token::{Token, Type};

/// Non-local control flow that unwinds statement execution: either a
/// `return` propagating to its enclosing call, or a runtime error
/// propagating to the top-level `interpret` call. Both travel the same
/// `Result::Err` path; only the function-call boundary treats `Return`
/// specially.
#[derive(Debug)]
pub enum Signal {
    Return(Object),
    Error(RuntimeError),
}

impl From<RuntimeError> for Signal {
    fn from(error: RuntimeError) -> Self {
        Signal::Error(error)
    }
}

type EvalResult = Result<Object, Signal>;
type ExecResult = Result<(), Signal>;

pub struct Interpreter {
    pub globals: Rc<RefCell<Environment>>,
    pub environment: Rc<RefCell<Environment>>,
    locals: HashMap<u64, usize>,
    output: Box<dyn Write>,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    /// Builds an interpreter that sends `print` output to `output` instead
    /// of the real stdout. Integration tests use this to capture a Lox
    /// program's output without spawning the `rocks` binary.
    pub fn with_writer(output: Box<dyn Write>) -> Self {
        let globals = Rc::new(RefCell::new(Environment::default()));
        for native in NativeFunction::globals() {
            globals.borrow_mut().define(native.name, Object::NativeFunction(native));
        }

        Interpreter { environment: Rc::clone(&globals), globals, locals: HashMap::new(), output }
    }

    /// Records that the expression node with this id resolved to a binding
    /// `depth` environments up from wherever it is evaluated.
    pub fn resolve(&mut self, id: u64, depth: usize) {
        self.locals.insert(id, depth);
    }

    pub fn interpret(&mut self, statements: &[Stmt]) {
        for statement in statements {
            if let Err(Signal::Error(error)) = self.execute(statement) {
                error.throw();
                return;
            }
        }
    }

    fn execute(&mut self, stmt: &Stmt) -> ExecResult {
        stmt.accept(self)
    }

    fn evaluate(&mut self, expr: &Expr) -> EvalResult {
        expr.accept(self)
    }

    /// Executes `statements` in a fresh scope enclosed by `environment`,
    /// restoring the previously active environment before returning, even
    /// when a `Signal` unwinds through this call.
    pub fn execute_block(&mut self, statements: &[Stmt], environment: Rc<RefCell<Environment>>) -> ExecResult {
        let previous = Rc::clone(&self.environment);
        self.environment = environment;

        let mut result = Ok(());
        for statement in statements {
            result = self.execute(statement);
            if result.is_err() {
                break;
            }
        }

        self.environment = previous;
        result
    }

    fn look_up_variable(&mut self, id: u64, name: &Token) -> Result<Object, RuntimeError> {
        match self.locals.get(&id) {
            Some(&distance) => self.environment.borrow().get_at(distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    fn check_number(operand: &Object, operator: &Token) -> Result<f64, RuntimeError> {
        match operand {
            Object::Literal(Literal::Number(n)) => Ok(*n),
            _ => Err(RuntimeError { token: operator.clone(), message: "Operand must be a number.".to_string() }),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl ExprVisitor<EvalResult> for Interpreter {
    fn visit_literal_expr(&mut self, literal: &Literal) -> EvalResult {
        Ok(Object::Literal(literal.clone()))
    }

    fn visit_logical_expr(&mut self, logical: &LogicalData) -> EvalResult {
        let left = self.evaluate(&logical.left)?;

        if logical.operator.r#type == Type::Or {
            if left.is_truthy() {
                return Ok(left);
            }
        } else if !left.is_truthy() {
            return Ok(left);
        }

        self.evaluate(&logical.right)
    }

    fn visit_unary_expr(&mut self, unary: &UnaryData) -> EvalResult {
        let right = self.evaluate(&unary.expr)?;

        match unary.operator.r#type {
            Type::Minus => Ok(Object::from(-Self::check_number(&right, &unary.operator)?)),
            Type::Bang => Ok(Object::from(!right.is_truthy())),
            _ => unreachable!("unary operator is always '-' or '!'"),
        }
    }

    fn visit_binary_expr(&mut self, binary: &BinaryData) -> EvalResult {
        let left = self.evaluate(&binary.left)?;
        let right = self.evaluate(&binary.right)?;
        let operator = &binary.operator;

        match operator.r#type {
            Type::Greater => {
                Ok(Object::from(Self::check_number(&left, operator)? > Self::check_number(&right, operator)?))
            }
            Type::GreaterEqual => {
                Ok(Object::from(Self::check_number(&left, operator)? >= Self::check_number(&right, operator)?))
            }
            Type::Less => {
                Ok(Object::from(Self::check_number(&left, operator)? < Self::check_number(&right, operator)?))
            }
            Type::LessEqual => {
                Ok(Object::from(Self::check_number(&left, operator)? <= Self::check_number(&right, operator)?))
            }
            Type::EqualEqual => Ok(Object::from(left == right)),
            Type::BangEqual => Ok(Object::from(left != right)),
            Type::Minus => Ok(Object::from(Self::check_number(&left, operator)? - Self::check_number(&right, operator)?)),
            Type::Slash => Ok(Object::from(Self::check_number(&left, operator)? / Self::check_number(&right, operator)?)),
            Type::Star => Ok(Object::from(Self::check_number(&left, operator)? * Self::check_number(&right, operator)?)),
            Type::Plus => match (&left, &right) {
                (Object::Literal(Literal::Number(l)), Object::Literal(Literal::Number(r))) => Ok(Object::from(l + r)),
                (Object::Literal(Literal::String(l)), Object::Literal(Literal::String(r))) => {
                    Ok(Object::from(format!("{l}{r}")))
                }
                _ => Err(Signal::Error(RuntimeError {
                    token: operator.clone(),
                    message: "Operands must be two numbers or two strings.".to_string(),
                })),
            },
            _ => unreachable!("parser never produces a non-binary operator here"),
        }
    }

    fn visit_grouping_expr(&mut self, grouping: &GroupingData) -> EvalResult {
        self.evaluate(&grouping.expr)
    }

    fn visit_variable_expr(&mut self, variable: &VariableData) -> EvalResult {
        Ok(self.look_up_variable(variable.id, &variable.name)?)
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) -> EvalResult {
        let value = self.evaluate(&assign.value)?;

        match self.locals.get(&assign.id) {
            Some(&distance) => {
                self.environment.borrow_mut().assign_at(distance, &assign.name, value.clone());
            }
            None => {
                self.globals.borrow_mut().assign(&assign.name, value.clone())?;
            }
        }

        Ok(value)
    }

    fn visit_call_expr(&mut self, call: &CallData) -> EvalResult {
        let callee = self.evaluate(&call.callee)?;

        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        let arity = match &callee {
            Object::Function(function) => function.arity(),
            Object::NativeFunction(function) => function.arity(),
            Object::Class(class) => class.borrow().arity(),
            _ => {
                return Err(Signal::Error(RuntimeError {
                    token: call.paren.clone(),
                    message: "Can only call functions and classes.".to_string(),
                }));
            }
        };

        if arguments.len() != arity {
            return Err(Signal::Error(RuntimeError {
                token: call.paren.clone(),
                message: format!("Expected {arity} arguments but got {}.", arguments.len()),
            }));
        }

        let result = match &callee {
            Object::Function(function) => function.call(self, arguments),
            Object::NativeFunction(function) => function.call(self, arguments),
            Object::Class(class) => {
                let class = Rc::clone(class);
                let class = class.borrow();
                class.call(self, arguments)
            }
            _ => unreachable!("callability already checked above"),
        };

        Ok(result?)
    }

    fn visit_get_expr(&mut self, get: &GetData) -> EvalResult {
        let object = self.evaluate(&get.object)?;

        match &object {
            Object::Instance(instance) => Ok(instance.borrow().get(&get.name, &object)?),
            _ => Err(Signal::Error(RuntimeError {
                token: get.name.clone(),
                message: "Only instances have properties.".to_string(),
            })),
        }
    }

    fn visit_set_expr(&mut self, set: &SetData) -> EvalResult {
        let object = self.evaluate(&set.object)?;

        let Object::Instance(instance) = &object else {
            return Err(Signal::Error(RuntimeError {
                token: set.name.clone(),
                message: "Only instances have fields.".to_string(),
            }));
        };

        let value = self.evaluate(&set.value)?;
        instance.borrow_mut().set(&set.name, value.clone());
        Ok(value)
    }

    fn visit_this_expr(&mut self, this: &ThisData) -> EvalResult {
        Ok(self.look_up_variable(this.id, &this.keyword)?)
    }

    fn visit_super_expr(&mut self, super_: &SuperData) -> EvalResult {
        Err(Signal::Error(RuntimeError {
            token: super_.keyword.clone(),
            message: "Can't use 'super': inheritance is not supported.".to_string(),
        }))
    }
}

impl StmtVisitor<ExecResult> for Interpreter {
    fn visit_expression_stmt(&mut self, stmt: &ExpressionData) -> ExecResult {
        self.evaluate(&stmt.expr)?;
        Ok(())
    }

    fn visit_print_stmt(&mut self, stmt: &PrintData) -> ExecResult {
        let value = self.evaluate(&stmt.expr)?;
        writeln!(self.output, "{value}").expect("write to output");
        Ok(())
    }

    fn visit_var_stmt(&mut self, stmt: &VarData) -> ExecResult {
        let value = match &stmt.initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Object::Literal(Literal::Nil),
        };

        self.environment.borrow_mut().define(&stmt.name.lexeme, value);
        Ok(())
    }

    fn visit_block_stmt(&mut self, stmt: &BlockData) -> ExecResult {
        let environment = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.environment)))));
        self.execute_block(&stmt.statements, environment)
    }

    fn visit_if_stmt(&mut self, stmt: &IfData) -> ExecResult {
        if self.evaluate(&stmt.condition)?.is_truthy() {
            self.execute(&stmt.then_branch)
        } else if let Some(else_branch) = &stmt.else_branch {
            self.execute(else_branch)
        } else {
            Ok(())
        }
    }

    fn visit_while_stmt(&mut self, stmt: &WhileData) -> ExecResult {
        while self.evaluate(&stmt.condition)?.is_truthy() {
            self.execute(&stmt.body)?;
        }
        Ok(())
    }

    fn visit_function_stmt(&mut self, stmt: &FunctionData) -> ExecResult {
        let function = Function::new(stmt.clone(), Rc::clone(&self.environment), false);
        self.environment.borrow_mut().define(&stmt.name.lexeme, Object::Function(function));
        Ok(())
    }

    fn visit_return_stmt(&mut self, stmt: &ReturnData) -> ExecResult {
        let value = match &stmt.value {
            Some(expr) => self.evaluate(expr)?,
            None => Object::Literal(Literal::Nil),
        };

        Err(Signal::Return(value))
    }

    fn visit_class_stmt(&mut self, stmt: &ClassData) -> ExecResult {
        self.environment.borrow_mut().define(&stmt.name.lexeme, Object::Literal(Literal::Nil));

        let mut methods = HashMap::new();
        for method in &stmt.methods {
            let is_initializer = method.name.lexeme == "init";
            let function = Function::new(method.clone(), Rc::clone(&self.environment), is_initializer);
            methods.insert(method.name.lexeme.clone(), function);
        }

        let class = Class::new(stmt.name.lexeme.clone(), methods);
        self.environment.borrow_mut().assign(&stmt.name, Object::Class(Rc::new(RefCell::new(class))))?;
        Ok(())
    }
}

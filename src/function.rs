use std::cell::RefCell;
use std::fmt::{Debug, Display};
use std::rc::Rc;

use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::interpreter::{Interpreter, Signal};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::FunctionData;
use crate::token::{Token, Type};

/// A user-defined function or method. `closure` is the environment active at
/// the point the `fun` statement was executed; calling the function always
/// creates a new scope enclosed by that one, not by whatever scope happens to
/// be current at the call site.
#[derive(Debug, Clone)]
pub struct Function {
    pub declaration: FunctionData,
    pub closure: Rc<RefCell<Environment>>,
    pub is_initializer: bool,
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.declaration == other.declaration && Rc::ptr_eq(&self.closure, &other.closure)
    }
}

impl Function {
    pub fn new(declaration: FunctionData, closure: Rc<RefCell<Environment>>, is_initializer: bool) -> Self {
        Function { declaration, closure, is_initializer }
    }

    /// Returns a copy of this function whose closure additionally binds
    /// `this` to `instance`. Used when a method is looked up off an instance.
    pub fn bind(&self, instance: Object) -> Function {
        let environment = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.closure)))));
        environment.borrow_mut().define("this", instance);
        Function::new(self.declaration.clone(), environment, self.is_initializer)
    }
}

impl Callable for Function {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        let environment = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&self.closure)))));

        for (param, arg) in self.declaration.params.iter().zip(arguments.into_iter()) {
            environment.borrow_mut().define(&param.lexeme, arg);
        }

        let result = interpreter.execute_block(&self.declaration.body, environment);

        match result {
            Ok(()) => {
                if self.is_initializer {
                    self.closure.borrow().get_at(0, &this_token()).map_err(|e| e)
                } else {
                    Ok(Object::Literal(Literal::Nil))
                }
            }
            Err(Signal::Return(value)) => {
                if self.is_initializer {
                    self.closure.borrow().get_at(0, &this_token())
                } else {
                    Ok(value)
                }
            }
            Err(Signal::Error(err)) => Err(err),
        }
    }

    fn arity(&self) -> usize {
        self.declaration.params.len()
    }
}

fn this_token() -> Token {
    Token::new(Type::This, "this".to_owned(), None, 0)
}

impl Display for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.lexeme)
    }
}

/// A built-in function implemented in Rust rather than Lox. The only one
/// this interpreter carries is `clock`.
#[derive(Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub function: fn(&mut Interpreter, Vec<Object>) -> Result<Object, RuntimeError>,
}

impl PartialEq for NativeFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Callable for NativeFunction {
    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        (self.function)(interpreter, arguments)
    }

    fn arity(&self) -> usize {
        self.arity
    }
}

impl NativeFunction {
    /// The built-ins seeded into the global environment.
    pub fn globals() -> Vec<NativeFunction> {
        vec![NativeFunction {
            name: "clock",
            arity: 0,
            function: |_, _| {
                let now = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs_f64();
                Ok(Object::Literal(Literal::Number(now)))
            },
        }]
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn>")
    }
}

impl Debug for NativeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<native fn>")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn empty_function() -> Function {
        let declaration = FunctionData {
            name: Token::new(Type::Identifier, "f".into(), None, 1),
            params: vec![],
            body: vec![],
        };
        Function::new(declaration, Rc::new(RefCell::new(Environment::default())), false)
    }

    #[test]
    fn display_uses_declared_name() {
        assert_eq!(empty_function().to_string(), "<fn f>");
    }

    #[test]
    fn bind_does_not_mutate_original_closure() {
        let f = empty_function();
        let bound = f.bind(Object::Literal(Literal::Nil));
        assert!(!f.closure.borrow().variables.contains_key("this"));
        assert!(bound.closure.borrow().variables.contains_key("this"));
    }

    #[test]
    fn clock_has_zero_arity_and_prints_native_fn() {
        let clock = NativeFunction::globals().into_iter().find(|f| f.name == "clock").unwrap();
        assert_eq!(clock.arity(), 0);
        assert_eq!(clock.to_string(), "<native fn>");
    }
}

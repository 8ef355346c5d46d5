use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::function::Function;
use crate::interpreter::Interpreter;
use crate::object::{Callable, Object};
use crate::token::Token;

/// A class value: its name and a method table. Calling a `Class` constructs
/// an `Instance` and, if an `init` method exists, binds and invokes it.
#[derive(Clone)]
pub struct Class {
    pub name: String,
    pub methods: HashMap<String, Function>,
}

impl Class {
    pub fn new(name: String, methods: HashMap<String, Function>) -> Self {
        Class { name, methods }
    }

    pub fn find_method(&self, name: &str) -> Option<Function> {
        self.methods.get(name).cloned()
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Debug for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<class {}>", self.name)
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Callable for Class {
    fn arity(&self) -> usize {
        self.find_method("init").map(|init| init.arity()).unwrap_or(0)
    }

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        let class = Rc::new(RefCell::new(self.clone()));
        let instance = Rc::new(RefCell::new(Instance::new(Rc::clone(&class))));

        if let Some(initializer) = self.find_method("init") {
            initializer.bind(Object::Instance(Rc::clone(&instance))).call(interpreter, arguments)?;
        }

        Ok(Object::Instance(instance))
    }
}

/// An instance of a user-defined class: a reference to its class plus a
/// mutable field map. Fields shadow methods of the same name.
#[derive(Clone)]
pub struct Instance {
    pub class: Rc<RefCell<Class>>,
    pub fields: HashMap<String, Object>,
}

impl Instance {
    pub fn new(class: Rc<RefCell<Class>>) -> Self {
        Instance { class, fields: HashMap::new() }
    }

    pub fn get(&self, name: &Token, this: &Object) -> Result<Object, RuntimeError> {
        if let Some(field) = self.fields.get(&name.lexeme) {
            return Ok(field.clone());
        }

        if let Some(method) = self.class.borrow().find_method(&name.lexeme) {
            return Ok(Object::Function(method.bind(this.clone())));
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined property '{}'.", name.lexeme),
        })
    }

    pub fn set(&mut self, name: &Token, value: Object) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<instance {}>", self.class.borrow().name)
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} instance", self.class.borrow().name)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::literal::Literal;
    use crate::token::Type;

    #[test]
    fn class_displays_bare_name() {
        let class = Class::new("Cake".to_string(), HashMap::new());
        assert_eq!(class.to_string(), "Cake");
    }

    #[test]
    fn instance_displays_class_name_and_suffix() {
        let class = Rc::new(RefCell::new(Class::new("Cake".to_string(), HashMap::new())));
        let instance = Instance::new(class);
        assert_eq!(instance.to_string(), "Cake instance");
    }

    #[test]
    fn get_on_missing_field_and_method_errors() {
        let class = Rc::new(RefCell::new(Class::new("Cake".to_string(), HashMap::new())));
        let instance = Instance::new(Rc::clone(&class));
        let name = Token::new(Type::Identifier, "flavor".into(), None, 1);
        let this = Object::Literal(Literal::Nil);
        assert!(instance.get(&name, &this).is_err());
    }

    #[test]
    fn set_then_get_returns_the_field() {
        let class = Rc::new(RefCell::new(Class::new("Cake".to_string(), HashMap::new())));
        let mut instance = Instance::new(class);
        let name = Token::new(Type::Identifier, "flavor".into(), None, 1);
        instance.set(&name, Object::Literal(Literal::String("vanilla".into())));
        let this = Object::Literal(Literal::Nil);
        assert_eq!(instance.get(&name, &this).unwrap(), Object::Literal(Literal::String("vanilla".into())));
    }
}

use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a scope frame. Closures, bound methods and the running
/// call may all hold the same frame.
pub type Env = Rc<RefCell<Environment>>;

/// One scope frame: its own bindings plus a link to the enclosing frame.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Env>,
}

fn undefined(name: &Token) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Env) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap `self` into a shareable handle.
    pub fn into_env(self) -> Env {
        Rc::new(RefCell::new(self))
    }

    /// Insert or overwrite a binding in this frame.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Look `name` up here, then along the enclosing chain.
    pub fn get(&self, name: &Token) -> Result<Value> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Overwrite an existing binding here or along the enclosing chain.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// Read `name` from the frame exactly `distance` links up, if bound there.
    pub fn value_at(&self, distance: usize, name: &str) -> Option<Value> {
        if distance == 0 {
            return self.values.get(name).cloned();
        }

        self.enclosing
            .as_ref()
            .and_then(|enclosing| enclosing.borrow().value_at(distance - 1, name))
    }

    /// Resolved read: no chain search, just `distance` hops.
    pub fn get_at(&self, distance: usize, name: &Token) -> Result<Value> {
        self.value_at(distance, &name.lexeme)
            .ok_or_else(|| undefined(name))
    }

    /// Resolved write: no chain search, just `distance` hops.
    pub fn assign_at(&mut self, distance: usize, name: &Token, value: Value) -> Result<()> {
        if distance == 0 {
            return match self.values.get_mut(&name.lexeme) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(undefined(name)),
            };
        }

        match &self.enclosing {
            Some(enclosing) => enclosing
                .borrow_mut()
                .assign_at(distance - 1, name, value),
            None => Err(undefined(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn ident(name: &str) -> Token {
        Token::new(TokenType::IDENTIFIER, name, 1)
    }

    #[test]
    fn get_walks_the_enclosing_chain() {
        let globals: Env = Environment::new().into_env();
        globals.borrow_mut().define("a", Value::Number(1.0));

        let inner = Environment::with_enclosing(Rc::clone(&globals));

        assert!(matches!(inner.get(&ident("a")), Ok(Value::Number(n)) if n == 1.0));
        assert!(inner.get(&ident("b")).is_err());
    }

    #[test]
    fn assign_to_unbound_name_fails() {
        let mut env = Environment::new();
        let err = env.assign(&ident("x"), Value::Nil).unwrap_err();

        assert_eq!(err.to_string(), "Undefined variable 'x'.\n[line 1]");
    }

    #[test]
    fn resolved_access_skips_shadowing_frames() {
        let outer: Env = Environment::new().into_env();
        outer.borrow_mut().define("v", Value::Number(1.0));

        let middle: Env = Environment::with_enclosing(Rc::clone(&outer)).into_env();
        middle.borrow_mut().define("v", Value::Number(2.0));

        let mut inner = Environment::with_enclosing(Rc::clone(&middle));

        assert!(matches!(inner.get_at(2, &ident("v")), Ok(Value::Number(n)) if n == 1.0));

        inner
            .assign_at(2, &ident("v"), Value::Number(3.0))
            .unwrap();

        assert!(matches!(outer.borrow().get(&ident("v")), Ok(Value::Number(n)) if n == 3.0));
        assert!(matches!(middle.borrow().get(&ident("v")), Ok(Value::Number(n)) if n == 2.0));
    }
}

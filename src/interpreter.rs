//! Tree‑walking evaluator.
//!
//! Statements execute against an environment handed in by the caller rather
//! than a "current environment" field, so a callee's frame can never leak
//! into the caller: every exit path (normal completion, control signal,
//! runtime error) simply returns to a caller still holding its own frame.
//!
//! Non‑local control flow travels in the [`Flow`] each statement returns,
//! never through `Err`; the error channel is reserved for [`LoxError`]s.

use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, LiteralValue, Stmt};
use crate::environment::{Env, Environment};
use crate::error::{LoxError, Result};
use crate::natives;
use crate::object::{Callable, LoxClass, LoxFunction, LoxInstance, NativeFunction};
use crate::resolver::Resolutions;
use crate::token::{Token, TokenType};
use crate::value::{unescape, Value};

/// How a statement finished.
#[derive(Debug, Clone)]
pub enum Flow {
    Normal,
    Return(Value),
    Break,
    Continue,
}

pub struct Interpreter {
    globals: Env,
    locals: Resolutions,
    out: Box<dyn Write>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// An interpreter printing to stdout, with the standard natives defined.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// An interpreter printing to `out`, with the standard natives defined.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        info!("Initializing Interpreter");

        let mut interpreter = Self {
            globals: Environment::new().into_env(),
            locals: HashMap::new(),
            out,
        };

        for native in natives::standard() {
            interpreter.define_native(native);
        }

        interpreter
    }

    /// Register a host function as a global. Must happen before the program
    /// that uses it runs.
    pub fn define_native(&mut self, native: NativeFunction) {
        debug!("Defining native function '{}'", native.name);

        self.globals
            .borrow_mut()
            .define(native.name, Value::Native(Rc::new(native)));
    }

    pub fn globals(&self) -> &Env {
        &self.globals
    }

    /// Merge a resolver table. Tables accumulate across REPL lines; ids are
    /// unique, so entries never clash. Entries are never evicted: closures
    /// from earlier lines may still evaluate the nodes they key.
    pub fn resolve(&mut self, resolutions: Resolutions) {
        debug!("Adding {} resolved reference(s)", resolutions.len());

        self.locals.extend(resolutions);
    }

    /// Run a resolved program at global scope, stopping at the first
    /// runtime error.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        let globals: Env = Rc::clone(&self.globals);

        for stmt in statements {
            // The resolver rejects top-level return/break/continue.
            self.execute(stmt, &globals)?;
        }

        self.out.flush()?;

        info!("Interpretation completed successfully");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────────

    /// Run `statements` in `env` (a fresh frame), stopping at the first
    /// non‑normal flow.
    pub(crate) fn execute_block(&mut self, statements: &[Stmt], env: Env) -> Result<Flow> {
        for stmt in statements {
            match self.execute(stmt, &env)? {
                Flow::Normal => {}
                signal => return Ok(signal),
            }
        }

        Ok(Flow::Normal)
    }

    pub(crate) fn execute(&mut self, stmt: &Stmt, env: &Env) -> Result<Flow> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr, env)?;
            }

            Stmt::Print {
                keyword,
                expression,
            } => {
                let value: Value = self.evaluate(expression, env)?;

                let text: String = match value {
                    Value::String(raw) => unescape(&raw).map_err(|c| {
                        LoxError::runtime(keyword, format!("Invalid escape sequence '\\{}'.", c))
                    })?,
                    other => other.to_string(),
                };

                writeln!(self.out, "{}", text)?;
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr, env)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}'", name.lexeme);
                env.borrow_mut().define(&name.lexeme, value);
            }

            Stmt::Block(statements) => {
                let frame: Env = Environment::with_enclosing(Rc::clone(env)).into_env();
                return self.execute_block(statements, frame);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition, env)?.is_truthy() {
                    return self.execute(then_branch, env);
                } else if let Some(else_stmt) = else_branch {
                    return self.execute(else_stmt, env);
                }
            }

            Stmt::While {
                condition,
                body,
                increment,
            } => {
                while self.evaluate(condition, env)?.is_truthy() {
                    match self.execute(body, env)? {
                        Flow::Break => break,
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Normal | Flow::Continue => {}
                    }

                    if let Some(increment) = increment {
                        self.evaluate(increment, env)?;
                    }
                }
            }

            Stmt::Function(decl) => {
                debug!("Defining function '{}'", decl.name.lexeme);

                let function = LoxFunction::new(Rc::clone(decl), Rc::clone(env), false);
                env.borrow_mut()
                    .define(&decl.name.lexeme, Value::Function(Rc::new(function)));
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr, env)?,
                    None => Value::Nil,
                };

                return Ok(Flow::Return(value));
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => {
                let superclass: Option<Rc<LoxClass>> = match superclass {
                    Some(expr) => match self.evaluate(expr, env)? {
                        Value::Class(class) => Some(class),
                        _ => {
                            let anchor: &Token = match expr {
                                Expr::Variable { name, .. } => name,
                                _ => name,
                            };
                            return Err(LoxError::runtime(anchor, "Superclass must be a class."));
                        }
                    },
                    None => None,
                };

                // Pre‑declared so method bodies can refer to the class.
                env.borrow_mut().define(&name.lexeme, Value::Nil);

                let method_env: Env = match &superclass {
                    Some(superclass) => {
                        let mut frame = Environment::with_enclosing(Rc::clone(env));
                        frame.define("super", Value::Class(Rc::clone(superclass)));
                        frame.into_env()
                    }
                    None => Rc::clone(env),
                };

                let methods: HashMap<String, Rc<LoxFunction>> = methods
                    .iter()
                    .map(|decl| {
                        let is_initializer: bool = decl.name.lexeme == "init";
                        let function = LoxFunction::new(
                            Rc::clone(decl),
                            Rc::clone(&method_env),
                            is_initializer,
                        );
                        (decl.name.lexeme.clone(), Rc::new(function))
                    })
                    .collect();

                debug!("Defining class '{}'", name.lexeme);

                let class = LoxClass::new(name.lexeme.clone(), superclass, methods);
                env.borrow_mut()
                    .assign(name, Value::Class(Rc::new(class)))?;
            }

            Stmt::Break(_) => return Ok(Flow::Break),

            Stmt::Continue(_) => return Ok(Flow::Continue),
        }

        Ok(Flow::Normal)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────────

    pub fn evaluate(&mut self, expr: &Expr, env: &Env) -> Result<Value> {
        match expr {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::String(s.clone()),
                LiteralValue::Bool(b) => Value::Bool(*b),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner, env),

            Expr::Unary { operator, right } => {
                let right: Value = self.evaluate(right, env)?;
                evaluate_unary(operator, right)
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left, env)?;
                let right: Value = self.evaluate(right, env)?;
                evaluate_binary(operator, left, right)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left, env)?;

                let short_circuit: bool = if operator.token_type == TokenType::OR {
                    left.is_truthy()
                } else {
                    !left.is_truthy()
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right, env)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name, env),

            Expr::Assign { id, name, value } => {
                let value: Value = self.evaluate(value, env)?;

                match self.locals.get(id) {
                    Some(&distance) => env
                        .borrow_mut()
                        .assign_at(distance, name, value.clone())?,
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee: Value = self.evaluate(callee, env)?;

                let mut values: Vec<Value> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument, env)?);
                }

                match &callee {
                    Value::Function(function) => self.call_value(function.as_ref(), values, paren),
                    Value::Native(native) => self.call_value(native.as_ref(), values, paren),
                    Value::Class(class) => self.call_value(class, values, paren),
                    _ => Err(LoxError::runtime(paren, "Can only call functions and classes.")),
                }
            }

            Expr::Get { object, name } => match self.evaluate(object, env)? {
                Value::Instance(instance) => LoxInstance::get(&instance, name),
                _ => Err(LoxError::runtime(name, "Only instances have properties.")),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object, env)? else {
                    return Err(LoxError::runtime(name, "Only instances have fields."));
                };

                let value: Value = self.evaluate(value, env)?;
                instance.borrow_mut().set(name, value.clone());

                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword, env),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method, env),
        }
    }

    /// Arity check shared by every callable, then dispatch.
    fn call_value(
        &mut self,
        callable: &dyn Callable,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value> {
        if arguments.len() != callable.arity() {
            return Err(LoxError::runtime(
                paren,
                format!(
                    "Expected {} arguments but got {}.",
                    callable.arity(),
                    arguments.len()
                ),
            ));
        }

        callable.call(self, arguments, paren)
    }

    fn look_up_variable(&self, id: ExprId, name: &Token, env: &Env) -> Result<Value> {
        match self.locals.get(&id) {
            Some(&distance) => env.borrow().get_at(distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    /// `super.method`: the superclass lives `distance` frames up, and the
    /// instance (`this`) one frame closer.
    fn evaluate_super(
        &self,
        id: ExprId,
        keyword: &Token,
        method: &Token,
        env: &Env,
    ) -> Result<Value> {
        let distance: usize = *self
            .locals
            .get(&id)
            .ok_or_else(|| LoxError::runtime(keyword, "Undefined variable 'super'."))?;

        let Value::Class(superclass) = env.borrow().get_at(distance, keyword)? else {
            return Err(LoxError::runtime(keyword, "Superclass must be a class."));
        };

        let instance = match env.borrow().value_at(distance.saturating_sub(1), "this") {
            Some(Value::Instance(instance)) => instance,
            _ => return Err(LoxError::runtime(keyword, "Undefined variable 'this'.")),
        };

        match superclass.find_method(&method.lexeme) {
            Some(found) => Ok(Value::Function(Rc::new(found.bind(instance)))),
            None => Err(LoxError::runtime(
                method,
                format!("Undefined property '{}'.", method.lexeme),
            )),
        }
    }
}

fn evaluate_unary(operator: &Token, right: Value) -> Result<Value> {
    match operator.token_type {
        TokenType::MINUS => match right {
            Value::Number(n) => Ok(Value::Number(-n)),
            _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
        },
        TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),
        _ => Err(LoxError::runtime(operator, "Invalid unary operator.")),
    }
}

fn evaluate_binary(operator: &Token, left: Value, right: Value) -> Result<Value> {
    match operator.token_type {
        TokenType::EQUAL_EQUAL => return Ok(Value::Bool(left.is_equal(&right))),
        TokenType::BANG_EQUAL => return Ok(Value::Bool(!left.is_equal(&right))),
        _ => {}
    }

    if operator.token_type == TokenType::PLUS {
        return match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
            _ => Err(LoxError::runtime(
                operator,
                "Operands must be two numbers or two strings.",
            )),
        };
    }

    let (Value::Number(a), Value::Number(b)) = (left, right) else {
        return Err(LoxError::runtime(operator, "Operands must be numbers."));
    };

    match operator.token_type {
        TokenType::MINUS => Ok(Value::Number(a - b)),
        TokenType::STAR => Ok(Value::Number(a * b)),
        // IEEE‑754: dividing by zero yields an infinity or NaN.
        TokenType::SLASH => Ok(Value::Number(a / b)),
        TokenType::GREATER => Ok(Value::Bool(a > b)),
        TokenType::GREATER_EQUAL => Ok(Value::Bool(a >= b)),
        TokenType::LESS => Ok(Value::Bool(a < b)),
        TokenType::LESS_EQUAL => Ok(Value::Bool(a <= b)),
        _ => Err(LoxError::runtime(operator, "Invalid binary operator.")),
    }
}

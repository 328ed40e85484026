use std::collections::HashMap;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ForthError {
    #[error("Division by zero!")]
    DivisionByZero,
    #[error("Empty stack!")]
    StackUnderflow,
    #[error("Unknown word: {0}")]
    UnknownWord(String),
    #[error("Invalid word: {0}")]
    InvalidWord(String),
}

pub type Value = i64;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Token {
    Number(Value),
    Operator(ForthOperator),
    Builtin(ForthBuiltin),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ForthOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

fn pop1(stack: &mut Vec<Value>) -> Result<Value, ForthError> {
    match stack.pop() {
        Some(num) => Ok(num),
        _ => Err(ForthError::StackUnderflow),
    }
}

fn pop2(stack: &mut Vec<Value>) -> Result<(Value, Value), ForthError> {
    match (stack.pop(), stack.pop()) {
        (Some(v1), Some(v2)) => Ok((v1, v2)),
        _ => Err(ForthError::StackUnderflow),
    }
}

impl ForthOperator {
    fn eval(&self, stack: &mut Vec<Value>) -> Result<Option<Value>, ForthError> {
        let result = match self {
            Self::Add => {
                let (op1, op2) = pop2(stack)?;
                op2 + op1
            }
            Self::Subtract => {
                let (op1, op2) = pop2(stack)?;
                op2 - op1
            }
            Self::Multiply => {
                let (op1, op2) = pop2(stack)?;
                op2 * op1
            }
            Self::Divide => {
                let (op1, op2) = pop2(stack)?;
                if op1 == 0 {
                    return Err(ForthError::DivisionByZero);
                }
                op2 / op1
            }
        };
        Ok(Some(result))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ForthBuiltin {
    Drop,
    Dup,
    Over,
    Swap,
}

impl ForthBuiltin {
    fn eval(&self, stack: &mut Vec<Value>) -> Result<Option<Value>, ForthError> {
        match self {
            Self::Drop => {
                pop1(stack)?;
            }
            Self::Dup => {
                let value = pop1(stack)?;
                stack.push(value);
                stack.push(value);
            }
            Self::Over => {
                let (num1, num2) = pop2(stack)?;
                stack.push(num2);
                stack.push(num1);
                stack.push(num2);
            }
            Self::Swap => {
                let (value1, value2) = pop2(stack)?;
                stack.push(value1);
                stack.push(value2);
            }
        }

        Ok(None)
    }
}

/// Lowercase tokens split on whitespace; anything outside printable ASCII
/// acts as a separator.
fn normalize(input: &str) -> Vec<String> {
    input
        .chars()
        .map(|c| if matches!(c, ' '..='~') { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

#[derive(Clone, Debug)]
struct Dictionary {
    words: HashMap<String, Vec<Token>>,
}

impl Dictionary {
    fn new() -> Self {
        let mut words = HashMap::new();

        words.insert("+".to_string(), vec![Token::Operator(ForthOperator::Add)]);
        words.insert(
            "-".to_string(),
            vec![Token::Operator(ForthOperator::Subtract)],
        );
        words.insert(
            "*".to_string(),
            vec![Token::Operator(ForthOperator::Multiply)],
        );
        words.insert(
            "/".to_string(),
            vec![Token::Operator(ForthOperator::Divide)],
        );
        words.insert("drop".to_string(), vec![Token::Builtin(ForthBuiltin::Drop)]);
        words.insert("dup".to_string(), vec![Token::Builtin(ForthBuiltin::Dup)]);
        words.insert("over".to_string(), vec![Token::Builtin(ForthBuiltin::Over)]);
        words.insert("swap".to_string(), vec![Token::Builtin(ForthBuiltin::Swap)]);

        Dictionary { words }
    }

    /// Stores `name` with its body expanded against the current entries.
    /// References are resolved now, not at evaluation time, so a later
    /// redefinition cannot reach back into words already defined.
    fn define(&mut self, command: &str) -> Result<(), ForthError> {
        let mut tokens = normalize(command);
        if tokens.is_empty() {
            return Err(ForthError::InvalidWord(command.trim().to_string()));
        }
        let name = tokens.remove(0);
        if name.parse::<Value>().is_ok() {
            return Err(ForthError::InvalidWord(name));
        }

        let mut expansion = Vec::new();
        for token in &tokens {
            if let Ok(num) = token.parse() {
                expansion.push(Token::Number(num));
            } else if let Some(body) = self.words.get(token) {
                expansion.extend_from_slice(body);
            } else {
                return Err(ForthError::UnknownWord(token.clone()));
            }
        }
        self.words.insert(name, expansion);

        Ok(())
    }

    fn resolve(&self, line: &str) -> Result<Vec<Token>, ForthError> {
        let mut tokens = Vec::new();
        for word in normalize(line) {
            if let Ok(num) = word.parse() {
                tokens.push(Token::Number(num));
            } else if let Some(expansion) = self.words.get(&word) {
                tokens.extend_from_slice(expansion);
            } else {
                return Err(ForthError::UnknownWord(word));
            }
        }

        Ok(tokens)
    }
}

#[derive(Debug)]
pub struct Forth {
    stack: Vec<Value>,
    dictionary: Dictionary,
}

impl Forth {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            dictionary: Dictionary::new(),
        }
    }

    /// Evaluates one line of input. On error the stack and the dictionary are
    /// left exactly as they were before the call.
    pub fn eval(&mut self, input: &str) -> Result<(), ForthError> {
        let mut stack = self.stack.clone();
        let mut dictionary = self.dictionary.clone();

        eval_line(&mut stack, &mut dictionary, input)?;

        self.stack = stack;
        self.dictionary = dictionary;

        Ok(())
    }

    pub fn format_stack(&self) -> String {
        self.stack
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn stack(&self) -> &[Value] {
        &self.stack
    }
}

impl Default for Forth {
    fn default() -> Self {
        Self::new()
    }
}

fn eval_line(
    stack: &mut Vec<Value>,
    dictionary: &mut Dictionary,
    input: &str,
) -> Result<(), ForthError> {
    let line = input.trim();
    if line.is_empty() {
        return Ok(());
    }

    if let Some(definition) = line.strip_prefix(':') {
        let (command, to_eval) = match definition.split_once(';') {
            Some((command, rest)) => (command, rest),
            None => (definition, ""),
        };
        dictionary.define(command)?;
        return eval_line(stack, dictionary, to_eval);
    }

    let tokens = dictionary.resolve(line)?;
    log::trace!("tokens: {:?}", tokens);
    run(stack, &tokens)
}

fn run(stack: &mut Vec<Value>, tokens: &[Token]) -> Result<(), ForthError> {
    for token in tokens {
        let result = match token {
            Token::Number(num) => Some(*num),
            Token::Operator(operator) => operator.eval(stack)?,
            Token::Builtin(builtin) => builtin.eval(stack)?,
        };
        if let Some(num) = result {
            stack.push(num);
        }

        log::trace!("stack: {:?}", stack);
    }

    Ok(())
}

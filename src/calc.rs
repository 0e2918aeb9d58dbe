//! Four-function calculator
//!
//! Left-to-right evaluation with chained operators. Dividing by zero does not
//! produce a number: it yields `Evaluation::DivisionByZero`, which the host
//! turns into the black hole.

use std::fmt;

/// Longest operand the display accepts
pub const MAX_INPUT_LEN: usize = 20;

/// Result line text after a division by zero
pub const BLACK_HOLE_MESSAGE: &str = "ERROR: Black Hole Detected";

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Operator::Add),
            '-' | '−' => Some(Operator::Subtract),
            '*' | 'x' | 'X' | '×' => Some(Operator::Multiply),
            '/' | '÷' => Some(Operator::Divide),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
        }
    }
}

/// Outcome of one binary operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    Value(f64),
    DivisionByZero,
}

/// Apply `op` to `a` and `b`
pub fn operate(a: f64, op: Operator, b: f64) -> Evaluation {
    match op {
        Operator::Add => Evaluation::Value(a + b),
        Operator::Subtract => Evaluation::Value(a - b),
        Operator::Multiply => Evaluation::Value(a * b),
        Operator::Divide if b == 0.0 => Evaluation::DivisionByZero,
        Operator::Divide => Evaluation::Value(a / b),
    }
}

/// Signals for the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcEvent {
    /// A division by zero just happened
    BlackHole,
}

/// What the result line shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Display {
    Number(f64),
    BlackHole,
}

impl fmt::Display for Display {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Display::Number(n) => write!(f, "{}", format_number(*n)),
            Display::BlackHole => f.write_str(BLACK_HOLE_MESSAGE),
        }
    }
}

/// Shortest text for a number, without a trailing `.0`
pub fn format_number(n: f64) -> String {
    if n == 0.0 {
        // Also folds -0 into 0
        return "0".to_string();
    }
    format!("{n}")
}

/// Parse an operand; an empty entry reads as 0
fn parse_operand(text: &str) -> f64 {
    if text.is_empty() || text == "." {
        return 0.0;
    }
    text.parse().unwrap_or(0.0)
}

/// Calculator input state
#[derive(Debug, Clone)]
pub struct Calculator {
    current_input: String,
    previous: Option<f64>,
    operator: Option<Operator>,
    expression: String,
    /// Equals was the last key; the next digit starts over
    equals_pressed: bool,
    display: Display,
    /// Set after a division by zero until `clear()`
    collapsed: bool,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    pub fn new() -> Self {
        Self {
            current_input: String::new(),
            previous: None,
            operator: None,
            expression: String::new(),
            equals_pressed: false,
            display: Display::Number(0.0),
            collapsed: false,
        }
    }

    /// Result line
    pub fn display(&self) -> Display {
        self.display
    }

    /// Operation line (`0` when empty)
    pub fn operation_text(&self) -> &str {
        if self.expression.is_empty() {
            "0"
        } else {
            &self.expression
        }
    }

    pub fn current_input(&self) -> &str {
        &self.current_input
    }

    /// True after a division by zero until cleared
    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Type a digit or decimal point
    pub fn input_digit(&mut self, c: char) {
        if self.collapsed || !(c.is_ascii_digit() || c == '.') {
            return;
        }
        if self.equals_pressed {
            self.current_input.clear();
            self.expression.clear();
            self.previous = None;
            self.equals_pressed = false;
        }
        if c == '.' && self.current_input.contains('.') {
            return;
        }
        if self.current_input.len() >= MAX_INPUT_LEN {
            return;
        }
        self.current_input.push(c);
        self.expression.push(c);
    }

    /// Press an operator key
    pub fn input_operator(&mut self, op: Operator) -> Option<CalcEvent> {
        if self.collapsed {
            return None;
        }
        self.equals_pressed = false;
        self.expression.push(op.symbol());

        let event = match self.operator {
            None => {
                self.previous = Some(match self.previous {
                    // Continue from the last result if no new digits were typed
                    Some(prev) if self.current_input.is_empty() => prev,
                    _ => parse_operand(&self.current_input),
                });
                None
            }
            Some(pending) => self.evaluate(pending),
        };
        if self.collapsed {
            return event;
        }

        self.current_input.clear();
        self.operator = Some(op);
        event
    }

    /// Press equals
    pub fn equals(&mut self) -> Option<CalcEvent> {
        if self.collapsed {
            return None;
        }
        let event = match self.operator {
            None => {
                let value = parse_operand(&self.current_input);
                self.previous = Some(value);
                None
            }
            Some(pending) => self.evaluate(pending),
        };
        if self.collapsed {
            return event;
        }

        self.current_input.clear();
        self.expression.clear();
        self.operator = None;
        self.equals_pressed = true;
        event
    }

    /// Reset to the initial `0` state
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Fold the pending operation into `previous`
    fn evaluate(&mut self, op: Operator) -> Option<CalcEvent> {
        let a = self.previous.unwrap_or(0.0);
        let b = parse_operand(&self.current_input);
        match operate(a, op, b) {
            Evaluation::Value(v) => {
                self.previous = Some(v);
                self.display = Display::Number(v);
                None
            }
            Evaluation::DivisionByZero => {
                log::info!("Division by zero: {} / {}", format_number(a), format_number(b));
                self.display = Display::BlackHole;
                self.collapsed = true;
                Some(CalcEvent::BlackHole)
            }
        }
    }
}

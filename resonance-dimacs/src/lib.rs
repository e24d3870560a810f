//! DIMACS CNF and edge format parsers and writers for the resonance solvers.
//!
//! CNF variables are named `x<index>` after their 1-based DIMACS index.

use std::{io, mem::replace};

use resonance_formula::{Formula, Lit, Var};

use anyhow::Error;
use thiserror::Error;

pub mod graph;

pub use graph::{parse_graph, write_graph, GraphParserError, MAX_VERTEX_COUNT};

/// Largest supported DIMACS variable index.
pub const MAX_VAR_COUNT: usize = (u32::max_value() >> 4) as usize + 1;

/// Errors of [`DimacsParser`].
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("line {line}: unexpected {unexpected:?} in DIMACS CNF input")]
    UnexpectedInput { line: usize, unexpected: char },
    #[error("line {line}: variable index {index}{final_digit}... is too large")]
    LiteralTooLarge {
        line: usize,
        index: usize,
        final_digit: usize,
    },
    #[error("line {line}: malformed header {header:?}")]
    InvalidHeader { line: usize, header: String },
    #[error("line {line}: last clause is missing its terminating 0")]
    UnterminatedClause { line: usize },
    #[error("variable index {var_count} exceeds the {header_var_count} variables of the header")]
    VarCount {
        var_count: usize,
        header_var_count: usize,
    },
    #[error("found {clause_count} clauses but the header announces {header_clause_count}")]
    ClauseCount {
        clause_count: usize,
        header_clause_count: usize,
    },
    #[error("parser used after it reported an error")]
    PreviousError,
}

/// Counts announced by a `p cnf` line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DimacsHeader {
    pub var_count: usize,
    pub clause_count: usize,
}

/// Where the parser is within the current line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mode {
    /// Nothing but a line break seen since the last line.
    LineStart,
    /// Inside a line of literals.
    Clause,
    Comment,
    Header,
}

/// A literal whose digits are still being read.
#[derive(Copy, Clone, Debug, Default)]
struct PendingLit {
    negated: bool,
    has_digits: bool,
    index: usize,
}

impl PendingLit {
    /// Appends a digit, failing when the index would exceed [`MAX_VAR_COUNT`].
    fn push_digit(&mut self, digit: usize) -> Result<(), (usize, usize)> {
        const CAN_OVERFLOW: usize = MAX_VAR_COUNT / 10;
        const OVERFLOW_DIGIT: usize = MAX_VAR_COUNT % 10;

        if self.index > CAN_OVERFLOW || (self.index == CAN_OVERFLOW && digit > OVERFLOW_DIGIT) {
            return Err((self.index, digit));
        }

        self.index = self.index * 10 + digit;
        self.has_digits = true;
        Ok(())
    }
}

/// Streaming parser for DIMACS CNF input.
///
/// Input can be fed in arbitrary chunks and the parsed clauses can be taken out in between.
pub struct DimacsParser {
    formula: Formula,
    partial_clause: Vec<Lit>,
    header: Option<DimacsHeader>,
    header_line: Vec<u8>,

    mode: Mode,
    pending: Option<PendingLit>,

    line_number: usize,
    clause_count: usize,
    max_var: usize,
    error: bool,
}

impl Default for DimacsParser {
    fn default() -> DimacsParser {
        DimacsParser::new()
    }
}

impl DimacsParser {
    pub fn new() -> DimacsParser {
        DimacsParser {
            formula: Formula::new(),
            partial_clause: vec![],
            header: None,
            header_line: vec![],

            mode: Mode::LineStart,
            pending: None,

            line_number: 1,
            clause_count: 0,
            max_var: 0,
            error: false,
        }
    }

    /// Parse the given input and check the header if present.
    pub fn parse(input: impl io::Read) -> Result<Formula, Error> {
        use io::BufRead;

        let mut reader = io::BufReader::new(input);
        let mut parser = Self::new();

        loop {
            let chunk = reader.fill_buf()?;
            let len = chunk.len();
            if len == 0 {
                break;
            }
            parser.parse_chunk(chunk)?;
            reader.consume(len);
        }
        parser.eof()?;
        parser.check_header()?;

        Ok(parser.take_formula())
    }

    /// Parse a chunk of input.
    ///
    /// After the last chunk call [`eof`](DimacsParser::eof). Once an error was returned every
    /// further call fails with [`ParserError::PreviousError`].
    pub fn parse_chunk(&mut self, chunk: &[u8]) -> Result<(), ParserError> {
        if self.error {
            return Err(ParserError::PreviousError);
        }
        for &byte in chunk {
            if let Err(err) = self.parse_byte(byte) {
                self.error = true;
                return Err(err);
            }
        }
        Ok(())
    }

    fn parse_byte(&mut self, byte: u8) -> Result<(), ParserError> {
        let line_break = byte == b'\n' || byte == b'\r';

        match (self.mode, byte) {
            (Mode::Header, _) if line_break => {
                self.parse_header_line()?;
                self.mode = Mode::LineStart;
            }
            (Mode::Header, _) => self.header_line.push(byte),
            (Mode::Comment, _) if line_break => self.mode = Mode::LineStart,
            (Mode::Comment, _) => (),
            (_, b'0'..=b'9') => {
                let pending = self.pending.get_or_insert_with(PendingLit::default);
                if let Err((index, final_digit)) = pending.push_digit((byte - b'0') as usize) {
                    return Err(ParserError::LiteralTooLarge {
                        line: self.line_number,
                        index,
                        final_digit,
                    });
                }
                self.mode = Mode::Clause;
            }
            (_, b'-') if self.pending.is_none() => {
                self.pending = Some(PendingLit {
                    negated: true,
                    ..PendingLit::default()
                });
                self.mode = Mode::Clause;
            }
            (_, b' ') | (_, b'\t') | (_, b'\n') | (_, b'\r')
                if self.pending.map_or(true, |pending| pending.has_digits) =>
            {
                self.finish_literal();
                self.mode = if line_break {
                    Mode::LineStart
                } else {
                    Mode::Clause
                };
            }
            (Mode::LineStart, b'c') => self.mode = Mode::Comment,
            (Mode::LineStart, b'p') if self.header.is_none() => {
                self.header_line.push(byte);
                self.mode = Mode::Header;
            }
            _ => {
                return Err(ParserError::UnexpectedInput {
                    line: self.line_number,
                    unexpected: byte as char,
                })
            }
        }

        if byte == b'\n' {
            self.line_number += 1;
        }
        Ok(())
    }

    /// Finish parsing the input.
    ///
    /// Header counts are not verified here, see [`check_header`](DimacsParser::check_header).
    pub fn eof(&mut self) -> Result<(), ParserError> {
        if self.mode == Mode::Header {
            if let Err(err) = self.parse_header_line() {
                self.error = true;
                return Err(err);
            }
        }
        self.mode = Mode::LineStart;

        self.finish_literal();

        if !self.partial_clause.is_empty() {
            return Err(ParserError::UnterminatedClause {
                line: self.line_number,
            });
        }

        Ok(())
    }

    /// Compares the parsed formula against the header, if there was one.
    ///
    /// The header's variable count only bounds the largest index used.
    pub fn check_header(&self) -> Result<(), ParserError> {
        let header = match self.header {
            Some(header) => header,
            None => return Ok(()),
        };
        if self.max_var > header.var_count {
            Err(ParserError::VarCount {
                var_count: self.max_var,
                header_var_count: header.var_count,
            })
        } else if self.clause_count != header.clause_count {
            Err(ParserError::ClauseCount {
                clause_count: self.clause_count,
                header_clause_count: header.clause_count,
            })
        } else {
            Ok(())
        }
    }

    /// Takes the clauses parsed so far, leaving an empty formula behind.
    pub fn take_formula(&mut self) -> Formula {
        replace(&mut self.formula, Formula::new())
    }

    /// Return the DIMACS CNF header data if present.
    pub fn header(&self) -> Option<DimacsHeader> {
        self.header
    }

    /// Number of clauses parsed.
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Largest variable index seen so far.
    pub fn var_count(&self) -> usize {
        self.max_var
    }

    /// Ends the pending literal. A `0` ends the current clause.
    fn finish_literal(&mut self) {
        match self.pending.take() {
            Some(PendingLit {
                has_digits: true,
                index: 0,
                ..
            }) => {
                let lits = replace(&mut self.partial_clause, vec![]);
                self.formula.add_lits(lits);
                self.clause_count += 1;
            }
            Some(PendingLit {
                has_digits: true,
                negated,
                index,
            }) => {
                self.max_var = self.max_var.max(index);
                self.partial_clause
                    .push(Var::from_dimacs(index as isize).lit(negated));
            }
            _ => (),
        }
    }

    fn parse_header_line(&mut self) -> Result<(), ParserError> {
        let line = String::from_utf8_lossy(&self.header_line).into_owned();
        let fields: Vec<&str> = line.split_whitespace().collect();

        let header = match fields[..] {
            ["p", "cnf", vars, clauses] => match (vars.parse(), clauses.parse()) {
                (Ok(var_count), Ok(clause_count)) => Some(DimacsHeader {
                    var_count,
                    clause_count,
                }),
                _ => None,
            },
            _ => None,
        };

        match header {
            None => Err(ParserError::InvalidHeader {
                line: self.line_number,
                header: line,
            }),
            Some(header) if header.var_count > MAX_VAR_COUNT => Err(ParserError::LiteralTooLarge {
                line: self.line_number,
                index: header.var_count / 10,
                final_digit: header.var_count % 10,
            }),
            Some(header) => {
                self.header = Some(header);
                Ok(())
            }
        }
    }
}

/// DIMACS index for every variable of the formula, in [`Formula::variables`] order.
///
/// If all variables use the `x<index>` naming scheme their indices are kept, otherwise variables
/// are numbered in order of first occurrence.
pub fn dimacs_numbering(formula: &Formula) -> Vec<usize> {
    let kept: Option<Vec<usize>> = formula
        .variables()
        .iter()
        .map(|var| var.to_dimacs().map(|number| number as usize))
        .collect();

    kept.unwrap_or_else(|| (1..=formula.var_count()).collect())
}

/// Write a DIMACS CNF header.
pub fn write_dimacs_header(target: &mut impl io::Write, header: DimacsHeader) -> io::Result<()> {
    writeln!(
        target,
        "p cnf {var_count} {clause_count}",
        var_count = header.var_count,
        clause_count = header.clause_count
    )
}

/// Write a formula as DIMACS CNF.
///
/// Variables are numbered as described in [`dimacs_numbering`].
pub fn write_dimacs(target: &mut impl io::Write, formula: &Formula) -> io::Result<()> {
    let numbering = dimacs_numbering(formula);

    write_dimacs_header(
        &mut *target,
        DimacsHeader {
            var_count: numbering.iter().copied().max().unwrap_or(0),
            clause_count: formula.len(),
        },
    )?;

    for clause in formula.iter() {
        for lit in clause.lits() {
            // Every literal's variable is part of the formula.
            let number = formula
                .var_index(lit.var())
                .map(|index| numbering[index] as isize)
                .unwrap_or(0);
            itoa::write(&mut *target, if lit.is_negative() { -number } else { number })?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use anyhow::Error;
    use proptest::{prelude::*, test_runner::TestCaseError};

    use resonance_formula::{cnf::strategy::*, formula};

    fn parse_err(input: &[u8]) -> ParserError {
        match DimacsParser::parse(input) {
            Ok(parsed) => panic!("parsed {:?} without error", parsed),
            Err(err) => match err.downcast::<ParserError>() {
                Ok(err) => err,
                Err(err) => panic!("unexpected error type {:?}", err),
            },
        }
    }

    #[test]
    fn clauses_span_lines() -> Result<(), Error> {
        let parsed = DimacsParser::parse(
            b"c leading comment\np cnf  5 3 \n 1\t-5\n 2 0 -3\r\n0  4 0\nc\n\n" as &[_],
        )?;

        assert_eq!(
            parsed,
            formula![
                1, -5, 2;
                -3;
                4;
            ]
        );
        Ok(())
    }

    #[test]
    fn chunks_split_anywhere() -> Result<(), Error> {
        let input = b"p cnf 12 2\n-12 3 0\n7 -1 0\n";
        let expected = DimacsParser::parse(&input[..])?;

        for split in 0..input.len() {
            let mut parser = DimacsParser::new();
            parser.parse_chunk(&input[..split])?;
            parser.parse_chunk(&input[split..])?;
            parser.eof()?;
            parser.check_header()?;
            assert_eq!(parser.take_formula(), expected);
            assert_eq!(parser.var_count(), 12);
            assert_eq!(parser.clause_count(), 2);
        }
        Ok(())
    }

    #[test]
    fn header_is_an_upper_bound() -> Result<(), Error> {
        let mut parser = DimacsParser::new();
        parser.parse_chunk(b"p cnf 10 1\n1 -3 0\n")?;
        parser.eof()?;
        parser.check_header()?;

        assert_eq!(
            parser.header(),
            Some(DimacsHeader {
                var_count: 10,
                clause_count: 1
            })
        );
        assert_eq!(parser.take_formula().var_count(), 2);
        Ok(())
    }

    #[test]
    fn malformed_headers() {
        for &input in [
            &b"pcnf 1 3"[..],
            &b"p dnf 1 3"[..],
            &b"p cnf 2"[..],
            &b"p cnf 2 2 2"[..],
            &b"p cnf two 2\n"[..],
        ]
        .iter()
        {
            match parse_err(input) {
                ParserError::InvalidHeader { .. } => (),
                err => panic!("unexpected error {:?}", err),
            }
        }

        match parse_err(format!("p cnf {} 1\n", MAX_VAR_COUNT + 1).as_bytes()) {
            ParserError::LiteralTooLarge { .. } => (),
            err => panic!("unexpected error {:?}", err),
        }

        match parse_err(b"p cnf 1 1\np cnf 1 1\n1 0\n") {
            ParserError::UnexpectedInput {
                line: 2,
                unexpected: 'p',
            } => (),
            err => panic!("unexpected error {:?}", err),
        }
    }

    #[test]
    fn errors_point_at_their_line() {
        match parse_err(b"c\np cnf two 2\n1 0\n") {
            ParserError::InvalidHeader { line: 2, .. } => (),
            err => panic!("unexpected error {:?}", err),
        }

        match parse_err(b"1 0\n2 -\n") {
            ParserError::UnexpectedInput {
                line: 2,
                unexpected: '\n',
            } => (),
            err => panic!("unexpected error {:?}", err),
        }
    }

    #[test]
    fn header_mismatch() {
        match parse_err(b"p cnf 2 1\n-3 0\n") {
            ParserError::VarCount {
                var_count: 3,
                header_var_count: 2,
            } => (),
            err => panic!("unexpected error {:?}", err),
        }

        match parse_err(b"p cnf 4 3\n1 0 2 0\n") {
            ParserError::ClauseCount {
                clause_count: 2,
                header_clause_count: 3,
            } => (),
            err => panic!("unexpected error {:?}", err),
        }
    }

    #[test]
    fn unexpected_input() {
        for &(input, unexpected) in [
            (&b"1 -2 x 0"[..], 'x'),
            (&b"-1 --2 0"[..], '-'),
            (&b"4-5 0"[..], '-'),
            (&b"- 1 0"[..], ' '),
            (&b"1 0\n c late comment\n"[..], 'c'),
        ]
        .iter()
        {
            match parse_err(input) {
                ParserError::UnexpectedInput { unexpected: found, .. } if found == unexpected => (),
                err => panic!("unexpected error {:?} for {:?}", err, input),
            }
        }
    }

    #[test]
    fn index_overflow() {
        match parse_err(format!("{}0 0", MAX_VAR_COUNT).as_bytes()) {
            ParserError::LiteralTooLarge { .. } => (),
            err => panic!("unexpected error {:?}", err),
        }

        let largest = format!("-{} 0\n", MAX_VAR_COUNT);
        assert!(DimacsParser::parse(largest.as_bytes()).is_ok());
    }

    #[test]
    fn errors_are_sticky() {
        let mut parser = DimacsParser::new();
        assert!(parser.parse_chunk(b"1 ?").is_err());
        match parser.parse_chunk(b"0\n") {
            Err(ParserError::PreviousError) => (),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn unterminated_clause() {
        match parse_err(b"1 0\n2 3") {
            ParserError::UnterminatedClause { line: 2 } => (),
            err => panic!("unexpected error {:?}", err),
        }
    }

    #[test]
    fn renumbers_named_variables() -> Result<(), Error> {
        let mut formula = Formula::new();
        formula.add_lits(vec![Var::new("rain").positive(), Var::new("wet").negative()]);
        formula.add_lits(vec![Var::new("wet").positive()]);

        let mut buf = vec![];
        write_dimacs(&mut buf, &formula)?;

        assert_eq!(&buf[..], &b"p cnf 2 2\n1 -2 0\n2 0\n"[..]);
        Ok(())
    }

    proptest! {
        #[test]
        fn written_formulas_parse_back(input in formula(1..100usize, 0..200, 1..10)) {
            let mut buf = vec![];
            write_dimacs(&mut buf, &input)?;

            let parsed = DimacsParser::parse(&buf[..])
                .map_err(|err| TestCaseError::fail(err.to_string()))?;

            prop_assert_eq!(parsed, input);
        }
    }
}

//! DIMACS CNF parser and writer for the s1t SAT solver.

use std::{borrow::Borrow, io};

use s1t_formula::{CnfFormula, Lit, Problem, ProblemSpec, Solution, Var};

use anyhow::Error;
use thiserror::Error;

/// Possible errors while parsing a DIMACS CNF problem.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error(
        "line {}: Unexpected character in DIMACS CNF input: '{}'",
        line,
        unexpected
    )]
    UnexpectedInput { line: usize, unexpected: char },
    #[error(
        "line {}: Literal index is too large: {}{}...",
        line,
        index,
        final_digit
    )]
    LiteralTooLarge {
        line: usize,
        index: usize,
        final_digit: usize,
    },
    #[error("line {}: Invalid problem line syntax: {}", line, header)]
    InvalidHeader { line: usize, header: String },
    #[error(
        "line {}: Variable {} is out of range, the problem line declares {} variables",
        line,
        var,
        var_count
    )]
    VarOutOfRange {
        line: usize,
        var: usize,
        var_count: usize,
    },
    #[error(
        "Formula has {} clauses while the problem line specifies {} clauses",
        clause_count,
        header_clause_count
    )]
    ClauseCount {
        clause_count: usize,
        header_clause_count: usize,
    },
    #[error("line {}: Dangling '-' not followed by a literal", line)]
    DanglingNegation { line: usize },
    #[error("Input contains no problem line")]
    MissingHeader,
    #[error("Parser invoked after a previous error")]
    PreviousError,
}

/// Parser for DIMACS CNF files.
///
/// The input can be consumed in chunks; [`parse`](DimacsParser::parse) drives
/// the whole pipeline for the common case of a single readable input.
///
/// A problem line is required and must precede all clause data. Within a
/// clause, repeated literals are dropped keeping the first occurrence. The
/// `0` terminator of the final clause may be omitted.
#[derive(Default)]
pub struct DimacsParser {
    formula: CnfFormula,
    partial_clause: Vec<Lit>,
    header: Option<ProblemSpec>,

    line_number: usize,
    clause_count: usize,
    partial_lit: usize,
    negate_next_lit: bool,

    in_lit: bool,
    in_comment_or_header: bool,
    in_header: bool,
    start_of_line: bool,
    error: bool,

    header_line: Vec<u8>,
}

impl DimacsParser {
    /// Create a new DIMACS CNF parser.
    pub fn new() -> DimacsParser {
        DimacsParser {
            formula: CnfFormula::new(),
            partial_clause: vec![],
            header: None,

            line_number: 1,
            clause_count: 0,
            partial_lit: 0,
            negate_next_lit: false,

            in_lit: false,
            in_comment_or_header: false,
            in_header: false,
            start_of_line: true,
            error: false,

            header_line: vec![],
        }
    }

    /// Parse the given input into a [`Problem`].
    ///
    /// Checks that the parsed clauses match the declared clause count. Chunked
    /// parsing is possible by calling [`parse_chunk`](DimacsParser::parse_chunk)
    /// directly, followed by [`eof`](DimacsParser::eof),
    /// [`check_header`](DimacsParser::check_header) and
    /// [`into_problem`](DimacsParser::into_problem).
    pub fn parse(input: impl io::Read) -> Result<Problem, Error> {
        use io::BufRead;

        let mut buffer = io::BufReader::new(input);
        let mut parser = Self::new();

        loop {
            let data = buffer.fill_buf()?;
            if data.is_empty() {
                break;
            }
            parser.parse_chunk(data)?;
            let len = data.len();
            buffer.consume(len);
        }
        parser.eof()?;
        parser.check_header()?;

        Ok(parser.into_problem())
    }

    /// Parse a chunk of input.
    ///
    /// After parsing the last chunk call the [`eof`](DimacsParser::eof) method.
    ///
    /// If this method returns an error, the parser is in an invalid state and
    /// cannot parse further chunks.
    pub fn parse_chunk(&mut self, chunk: &[u8]) -> Result<(), ParserError> {
        if self.error {
            return Err(ParserError::PreviousError);
        }
        for &byte in chunk.iter() {
            if byte == b'\n' {
                self.line_number += 1;
            }
            match byte {
                b'\n' | b'\r' if self.in_comment_or_header => {
                    if self.in_header {
                        self.in_header = false;
                        self.parse_header_line()?;
                    }
                    self.in_comment_or_header = false;
                    self.start_of_line = true
                }
                _ if self.in_comment_or_header => {
                    if self.in_header {
                        self.header_line.push(byte);
                    }
                }
                b'0'..=b'9' if self.header.is_some() => {
                    self.in_lit = true;
                    let digit = (byte - b'0') as usize;

                    const CAN_OVERFLOW: usize = Var::max_count() / 10;
                    const OVERFLOW_DIGIT: usize = Var::max_count() % 10;

                    // Overflow check that is fast but still works if LitIdx has
                    // the same size as usize
                    if CAN_OVERFLOW <= self.partial_lit {
                        let carry = (digit <= OVERFLOW_DIGIT) as usize;

                        if CAN_OVERFLOW + carry <= self.partial_lit {
                            self.error = true;
                            return Err(ParserError::LiteralTooLarge {
                                line: self.line_number,
                                index: self.partial_lit,
                                final_digit: digit,
                            });
                        }
                    }

                    self.partial_lit = self.partial_lit * 10 + digit;

                    self.start_of_line = false
                }
                b'-' if self.header.is_some() && !self.negate_next_lit && !self.in_lit => {
                    self.negate_next_lit = true;
                    self.start_of_line = false
                }
                b' ' | b'\t' | b'\n' | b'\r' if !self.negate_next_lit || self.in_lit => {
                    self.finish_literal()?;
                    self.negate_next_lit = false;
                    self.in_lit = false;
                    self.partial_lit = 0;
                    self.start_of_line = byte == b'\n' || byte == b'\r';
                }
                b'c' if self.start_of_line => {
                    self.in_comment_or_header = true;
                }
                b'p' if self.start_of_line && self.header.is_none() => {
                    self.in_comment_or_header = true;
                    self.in_header = true;
                    self.header_line.push(b'p');
                }
                _ => {
                    self.error = true;
                    return Err(ParserError::UnexpectedInput {
                        line: self.line_number,
                        unexpected: byte as char,
                    });
                }
            }
        }

        Ok(())
    }

    /// Finish parsing the input.
    ///
    /// A clause still pending at this point is completed as if terminated by a
    /// `0`: the final terminator is optional. This does not check whether the
    /// declared clause count was matched, call
    /// [`check_header`](DimacsParser::check_header) for that.
    pub fn eof(&mut self) -> Result<(), ParserError> {
        if self.in_header {
            self.in_header = false;
            self.parse_header_line()?;
        }

        if self.negate_next_lit && !self.in_lit {
            self.error = true;
            return Err(ParserError::DanglingNegation {
                line: self.line_number,
            });
        }

        self.finish_literal()?;

        if !self.partial_clause.is_empty() {
            self.formula.add_clause(&self.partial_clause);
            self.partial_clause.clear();
            self.clause_count += 1;
        }

        if self.header.is_none() {
            self.error = true;
            return Err(ParserError::MissingHeader);
        }

        Ok(())
    }

    /// Verifies the clause count declared by the problem line.
    pub fn check_header(&self) -> Result<(), ParserError> {
        if let Some(header) = &self.header {
            if self.clause_count != header.clause_count {
                return Err(ParserError::ClauseCount {
                    clause_count: self.clause_count,
                    header_clause_count: header.clause_count,
                });
            }
        }

        Ok(())
    }

    /// Consume the parser, producing the parsed problem.
    pub fn into_problem(self) -> Problem {
        let DimacsParser {
            formula, header, ..
        } = self;
        match header {
            Some(spec) => Problem { spec, formula },
            None => Problem::from_formula(formula),
        }
    }

    fn finish_literal(&mut self) -> Result<(), ParserError> {
        if self.in_lit {
            if self.partial_lit == 0 {
                self.formula.add_clause(&self.partial_clause);
                self.partial_clause.clear();
                self.clause_count += 1;
            } else {
                if let Some(header) = &self.header {
                    if self.partial_lit > header.var_count {
                        self.error = true;
                        return Err(ParserError::VarOutOfRange {
                            line: self.line_number,
                            var: self.partial_lit,
                            var_count: header.var_count,
                        });
                    }
                }
                let lit = Var::from_dimacs(self.partial_lit as isize).lit(!self.negate_next_lit);
                if !self.partial_clause.contains(&lit) {
                    self.partial_clause.push(lit);
                }
            }
        }
        Ok(())
    }

    fn parse_header_line(&mut self) -> Result<(), ParserError> {
        let header_line = String::from_utf8_lossy(&self.header_line).into_owned();

        if !header_line.starts_with("p ") {
            return self.invalid_header(header_line);
        }

        let mut header_values = header_line[2..].split_whitespace();

        let format = match header_values.next() {
            Some(format) if format.contains("cnf") => format.to_string(),
            _ => return self.invalid_header(header_line),
        };

        let var_count: usize = match header_values
            .next()
            .and_then(|value| str::parse(value).ok())
        {
            None => return self.invalid_header(header_line),
            Some(value) => value,
        };

        if var_count > Var::max_count() {
            self.error = true;
            return Err(ParserError::LiteralTooLarge {
                line: self.line_number,
                index: var_count / 10,
                final_digit: var_count % 10,
            });
        }

        let clause_count: usize = match header_values
            .next()
            .and_then(|value| str::parse(value).ok())
        {
            None => return self.invalid_header(header_line),
            Some(value) => value,
        };

        if header_values.next().is_some() {
            return self.invalid_header(header_line);
        }

        self.formula.set_var_count(var_count);

        self.header = Some(ProblemSpec {
            format,
            var_count,
            clause_count,
        });

        Ok(())
    }

    fn invalid_header(&mut self, header_line: String) -> Result<(), ParserError> {
        self.error = true;
        Err(ParserError::InvalidHeader {
            line: self.line_number,
            header: header_line,
        })
    }
}

/// Write a DIMACS CNF header.
///
/// Can be used with [`write_dimacs_clauses`] to implement incremental writing.
pub fn write_dimacs_header(
    target: &mut impl io::Write,
    var_count: usize,
    clause_count: usize,
) -> io::Result<()> {
    writeln!(target, "p cnf {} {}", var_count, clause_count)
}

/// Write an iterator of clauses as headerless DIMACS CNF.
///
/// Can be used with [`write_dimacs_header`] to implement incremental writing.
pub fn write_dimacs_clauses(
    target: &mut impl io::Write,
    clauses: impl IntoIterator<Item = impl IntoIterator<Item = impl Borrow<Lit>>>,
) -> io::Result<()> {
    for clause in clauses.into_iter() {
        for lit in clause.into_iter() {
            itoa::write(&mut *target, lit.borrow().to_dimacs())?;
            target.write_all(b" ")?;
        }
        target.write_all(b"0\n")?;
    }
    Ok(())
}

/// Write a formula as DIMACS CNF.
pub fn write_dimacs(target: &mut impl io::Write, formula: &CnfFormula) -> io::Result<()> {
    write_dimacs_header(&mut *target, formula.var_count(), formula.len())?;
    write_dimacs_clauses(&mut *target, formula.iter())
}

/// Write a solution in DIMACS solution format.
///
/// The header line is `s <format> <sat_flag> <var_count> <clause_count>`,
/// echoing the problem's declared values, with a `sat_flag` of `1` for SAT and
/// `0` for UNSAT. For a SAT verdict one `v <lit>` line follows per variable in
/// ascending order, positive when the variable is assigned true.
pub fn write_solution(
    target: &mut impl io::Write,
    problem: &Problem,
    solution: &Solution,
) -> io::Result<()> {
    writeln!(
        target,
        "s {} {} {} {}",
        problem.spec.format,
        solution.is_sat() as usize,
        problem.spec.var_count,
        problem.spec.clause_count
    )?;
    if let Some(assignment) = solution.assignment() {
        for (index, &value) in assignment.iter().enumerate() {
            target.write_all(b"v ")?;
            itoa::write(&mut *target, Lit::from_index(index, value).to_dimacs())?;
            target.write_all(b"\n")?;
        }
    }
    Ok(())
}

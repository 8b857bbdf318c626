//! Loaders for symmetry-generator files.
//!
//! Two formats are supported:
//!
//! - *BreakID*: one generator per line, written as a product of disjoint
//!   cycles over signed DIMACS literals, e.g. `( 1 2 ) ( -1 -2 )`. A line
//!   starting with `r` (the row-interchangeability section) ends the
//!   generator list.
//! - *Bliss/Saucy*: one generator per non-comment line, given as the image
//!   list of variables `1..n` in signed DIMACS convention; converted to
//!   cycle (dense table) form at load.
//!
//! Both formats are complement-preserving by construction.

use crate::clause::{Lit, Var};
use crate::dimacs::{next_byte, parse_error, parse_int, skip_line, skip_whitespace};
use crate::interface::SolverInterface;
use crate::symmetry::SymGenerator;
use std::io::{self, BufRead};

fn lit_of_dimacs<S: SolverInterface>(solver: &S, parsed: i32) -> io::Result<Lit> {
    let var = (parsed.abs() - 1) as u32;
    if var >= solver.num_vars() {
        return parse_error(format!(
            "SYMMETRY PARSE ERROR! literal {} out of range (formula has {} variables)",
            parsed,
            solver.num_vars()
        ));
    }
    Ok(Lit::new(Var::from_idx(var), parsed > 0))
}

/// Parse a BreakID symmetry file and register every generator with the
/// solver. Returns the number of generators read.
pub fn parse_breakid<S: SolverInterface, R: BufRead>(
    input: &mut R,
    solver: &mut S,
) -> io::Result<usize> {
    let num_vars = solver.num_vars();
    let mut n_gens = 0;
    loop {
        skip_whitespace(input)?;
        match next_byte(input)? {
            None => break,
            Some(b'r') => break, // row interchangeability section
            Some(b'c') => {
                skip_line(input)?;
            }
            Some(b'(') => {
                let mut cycles: Vec<Vec<Lit>> = vec![];
                loop {
                    skip_inline_space(input)?;
                    match next_byte(input)? {
                        Some(b'(') => {
                            input.consume(1);
                            cycles.push(read_cycle(input, solver)?);
                        }
                        Some(b'\n') | None => {
                            if let Some(_) = next_byte(input)? {
                                input.consume(1);
                            }
                            break;
                        }
                        Some(ch) => {
                            return parse_error(format!(
                                "SYMMETRY PARSE ERROR! Unexpected char: {}",
                                ch as char
                            ))
                        }
                    }
                }
                solver.add_generator(SymGenerator::from_cycles(num_vars, &cycles));
                n_gens += 1;
            }
            Some(ch) => {
                return parse_error(format!(
                    "SYMMETRY PARSE ERROR! Unexpected char: {}",
                    ch as char
                ))
            }
        }
    }
    Ok(n_gens)
}

fn read_cycle<S: SolverInterface, R: BufRead>(
    input: &mut R,
    solver: &S,
) -> io::Result<Vec<Lit>> {
    let mut cycle = vec![];
    loop {
        skip_inline_space(input)?;
        match next_byte(input)? {
            Some(b')') => {
                input.consume(1);
                if cycle.len() < 2 {
                    return parse_error("SYMMETRY PARSE ERROR! cycle shorter than 2".to_string());
                }
                return Ok(cycle);
            }
            Some(_) => {
                let parsed = parse_int(input)?;
                if parsed == 0 {
                    return parse_error("SYMMETRY PARSE ERROR! literal 0 in cycle".to_string());
                }
                cycle.push(lit_of_dimacs(solver, parsed)?);
            }
            None => {
                return parse_error("SYMMETRY PARSE ERROR! EOF inside cycle".to_string());
            }
        }
    }
}

/// Parse a Bliss/Saucy mapping file and register every generator with the
/// solver. Returns the number of generators read.
pub fn parse_bliss<S: SolverInterface, R: BufRead>(
    input: &mut R,
    solver: &mut S,
) -> io::Result<usize> {
    let num_vars = solver.num_vars();
    let mut n_gens = 0;
    loop {
        skip_whitespace(input)?;
        match next_byte(input)? {
            None => break,
            Some(b'c') => {
                skip_line(input)?;
            }
            Some(_) => {
                let mut images = Vec::with_capacity(num_vars as usize);
                for _ in 0..num_vars {
                    let parsed = parse_int(input)?;
                    if parsed == 0 {
                        return parse_error(
                            "SYMMETRY PARSE ERROR! literal 0 in image list".to_string(),
                        );
                    }
                    images.push(lit_of_dimacs(solver, parsed)?);
                }
                solver.add_generator(SymGenerator::from_images(num_vars, &images));
                n_gens += 1;
            }
        }
    }
    Ok(n_gens)
}

// Skip spaces and tabs, but not newlines (generators are line-delimited).
fn skip_inline_space<R: BufRead>(input: &mut R) -> io::Result<()> {
    while let Some(ch) = next_byte(input)? {
        if ch == b' ' || ch == b'\t' || ch == b'\r' {
            input.consume(1);
        } else {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{BasicSolver, SolverInterface};
    use std::io::Cursor;

    fn solver_with_vars(n: u32) -> BasicSolver {
        let mut s = BasicSolver::default();
        for _ in 0..n {
            s.new_var_default();
        }
        s
    }

    fn lit(l: i32) -> Lit {
        Lit::new(Var::from_idx((l.abs() - 1) as u32), l > 0)
    }

    #[test]
    fn test_parse_breakid() {
        let data = b"( 1 2 ) ( -1 -2 )\n( 3 4 5 ) ( -3 -4 -5 )\nrows 2\n";
        let mut s = solver_with_vars(5);
        let n = parse_breakid(&mut Cursor::new(&data[..]), &mut s).unwrap();
        assert_eq!(n, 2);
        let g0 = s.generator(0).unwrap();
        assert_eq!(g0.image(lit(1)), lit(2));
        assert_eq!(g0.image(lit(-2)), lit(-1));
        let g1 = s.generator(1).unwrap();
        assert_eq!(g1.image(lit(4)), lit(5));
        assert_eq!(g1.image(lit(5)), lit(3));
    }

    #[test]
    fn test_parse_breakid_out_of_range() {
        let data = b"( 1 9 )\n";
        let mut s = solver_with_vars(3);
        assert!(parse_breakid(&mut Cursor::new(&data[..]), &mut s).is_err());
    }

    #[test]
    fn test_parse_bliss() {
        let data = b"c generated by saucy\n2 1 -3\n";
        let mut s = solver_with_vars(3);
        let n = parse_bliss(&mut Cursor::new(&data[..]), &mut s).unwrap();
        assert_eq!(n, 1);
        let g = s.generator(0).unwrap();
        assert_eq!(g.image(lit(1)), lit(2));
        assert_eq!(g.image(lit(3)), lit(-3));
        assert_eq!(g.image(lit(-3)), lit(3));
    }
}

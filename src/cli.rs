use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use electric_processing::data::geometry::parse_dimension;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq)]
pub struct Args {
    pub thickness_mm: Option<f64>,
    pub diameter_mm: Option<f64>,
    pub dir: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub overwrite: bool,
    pub help: bool,
}

pub const USAGE: &str = "\
Usage: electric-processing [OPTIONS]

Processes every sweep file in the working directory into a workbook,
Zview files and plain-data files.

Options:
  --thickness <MM>   sample thickness in millimetres (prompted if absent)
  --diameter <MM>    sample diameter in millimetres (prompted if absent)
  --dir <DIR>        directory holding the sweep files [default: .]
  --config <FILE>    JSON settings file
  --overwrite        replace outputs of a previous run without asking
  -h, --help         print this help";

pub fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        let mut value = |flag: &str| {
            args.next()
                .with_context(|| format!("{flag} needs a value"))
        };
        match arg.as_str() {
            "--thickness" => {
                parsed.thickness_mm = Some(parse_dimension("thickness", &value("--thickness")?)?)
            }
            "--diameter" => {
                parsed.diameter_mm = Some(parse_dimension("diameter", &value("--diameter")?)?)
            }
            "--dir" => parsed.dir = Some(PathBuf::from(value("--dir")?)),
            "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
            "--overwrite" => parsed.overwrite = true,
            "-h" | "--help" => parsed.help = true,
            other => bail!("unknown argument '{other}'\n\n{USAGE}"),
        }
    }
    Ok(parsed)
}

// ---------------------------------------------------------------------------
// Interactive prompts
// ---------------------------------------------------------------------------

/// Ask until the answer is a positive number.
pub fn prompt_dimension(
    input: &mut impl BufRead,
    output: &mut impl Write,
    parameter: &'static str,
) -> Result<f64> {
    loop {
        write!(output, "Enter the {parameter} of the sample in mm: ")?;
        output.flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            bail!("no {parameter} given");
        }
        match parse_dimension(parameter, &line) {
            Ok(value) => return Ok(value),
            Err(_) => writeln!(
                output,
                "The values should be only positive numbers, e.g. 1.2 and 13.5."
            )?,
        }
    }
}

pub fn confirm_overwrite(input: &mut impl BufRead, output: &mut impl Write) -> io::Result<bool> {
    write!(output, "Do you want to overwrite all files? Type Yes/No: ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().eq_ignore_ascii_case("yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_all_flags() {
        let parsed = parse_args(args(&[
            "--thickness", "1.5", "--diameter", "12", "--dir", "data", "--overwrite",
        ]))
        .unwrap();
        assert_eq!(parsed.thickness_mm, Some(1.5));
        assert_eq!(parsed.diameter_mm, Some(12.0));
        assert_eq!(parsed.dir, Some(PathBuf::from("data")));
        assert!(parsed.overwrite);
    }

    #[test]
    fn rejects_bad_values_and_unknown_flags() {
        assert!(parse_args(args(&["--thickness", "0"])).is_err());
        assert!(parse_args(args(&["--diameter"])).is_err());
        assert!(parse_args(args(&["--fast"])).is_err());
    }

    #[test]
    fn prompt_retries_until_valid() {
        let mut input = io::Cursor::new("abc\n-1\n2.5\n");
        let mut output = Vec::new();
        let value = prompt_dimension(&mut input, &mut output, "thickness").unwrap();
        assert_eq!(value, 2.5);
        let shown = String::from_utf8(output).unwrap();
        assert_eq!(shown.matches("Enter the thickness").count(), 3);
    }

    #[test]
    fn prompt_gives_up_on_end_of_input() {
        let mut input = io::Cursor::new("");
        assert!(prompt_dimension(&mut input, &mut Vec::new(), "diameter").is_err());
    }

    #[test]
    fn overwrite_answer() {
        assert!(confirm_overwrite(&mut io::Cursor::new("Yes\n"), &mut Vec::new()).unwrap());
        assert!(confirm_overwrite(&mut io::Cursor::new("yes\n"), &mut Vec::new()).unwrap());
        assert!(!confirm_overwrite(&mut io::Cursor::new("No\n"), &mut Vec::new()).unwrap());
    }
}

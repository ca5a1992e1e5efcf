use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use clap::Parser;
use teeny_core::sources::collect_sources;
use teeny_core::{CoreError, dump_tokens, translate};

/// Translate Teeny programs into C.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short, long, help = "Source file to translate (reads stdin when absent)")]
    input: Option<String>,

    #[arg(
        long,
        value_name = "DIR",
        conflicts_with = "input",
        help = "Translate every .teeny file under DIR; --output names the output directory"
    )]
    input_dir: Option<String>,

    #[arg(short, long)]
    output: String,

    #[arg(
        long,
        value_name = "FORMAT",
        default_value = "c",
        help = "Output format: c, tokens"
    )]
    emit: String,

    #[arg(
        long,
        value_name = "COMPILER",
        help = "Build each generated C file with this native compiler"
    )]
    cc: Option<String>,

    #[arg(short, long, help = "Report progress on stderr")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    execute(cli)
}

fn execute(cli: Cli) -> Result<()> {
    if let Some(dir) = &cli.input_dir {
        return translate_dir(&cli, Path::new(dir));
    }

    let source = match &cli.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {path}"))?,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let name = cli.input.as_deref().unwrap_or("<stdin>");

    let text = render(&source, &cli.emit).with_context(|| format!("failed to translate {name}"))?;
    let output = PathBuf::from(&cli.output);
    write_output(&output, text.as_bytes())?;
    if cli.verbose {
        eprintln!("translated {name} -> {}", output.display());
    }

    finish(&cli, &output)
}

/// Translate a whole directory. Every file is translated before any
/// output is written, so one bad program leaves the output untouched.
fn translate_dir(cli: &Cli, dir: &Path) -> Result<()> {
    let files = collect_sources(dir)
        .with_context(|| format!("failed to scan source directory {}", dir.display()))?;
    if files.is_empty() {
        bail!("no .teeny files found under {}", dir.display());
    }

    let extension = match cli.emit.as_str() {
        "tokens" => "tokens",
        _ => "c",
    };

    let mut rendered = Vec::with_capacity(files.len());
    for file in &files {
        let text = render(&file.contents, &cli.emit)
            .with_context(|| format!("failed to translate {}", file.path.display()))?;
        let output = Path::new(&cli.output).join(file.path.with_extension(extension));
        rendered.push((output, text));
    }

    for (output, text) in &rendered {
        write_output(output, text.as_bytes())?;
        if cli.verbose {
            eprintln!("wrote {}", output.display());
        }
        finish(cli, output)?;
    }

    if cli.verbose {
        eprintln!("translated {} file(s)", rendered.len());
    }
    Ok(())
}

fn render(source: &str, emit: &str) -> Result<String, CoreError> {
    match emit {
        "c" => Ok(translate(source)?.c_source),
        "tokens" => dump_tokens(source),
        other => Err(CoreError::UnsupportedFormat(other.to_string())),
    }
}

/// Runs the optional native build step for one written output file.
fn finish(cli: &Cli, output: &Path) -> Result<()> {
    let Some(cc) = &cli.cc else {
        return Ok(());
    };
    if cli.emit != "c" {
        eprintln!("--cc is ignored for non-C outputs");
        return Ok(());
    }

    let executable = executable_path(output);
    let status = Command::new(cc)
        .arg(output)
        .arg("-o")
        .arg(&executable)
        .status()
        .with_context(|| format!("failed to invoke C compiler {cc}"))?;
    if !status.success() {
        bail!("C compiler {cc} failed on {} ({status})", output.display());
    }
    if cli.verbose {
        eprintln!("built {}", executable.display());
    }
    Ok(())
}

fn executable_path(output: &Path) -> PathBuf {
    let stripped = output.with_extension("");
    if stripped == output {
        output.with_extension("out")
    } else {
        stripped
    }
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {parent:?}"))?;
        }
    }
    fs::write(path, bytes)
        .with_context(|| format!("failed to write output file {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_cmd::Command;
    use predicates::prelude::*;
    use tempfile::tempdir;

    #[test]
    fn translates_file_to_c() {
        let dir = tempdir().expect("tempdir");
        let input_path = dir.path().join("input.teeny");
        fs::write(&input_path, "let x = 5\nprint x\n").expect("write input");
        let output_path = dir.path().join("out.c");

        Command::cargo_bin("teeny-cli")
            .expect("binary exists")
            .arg("--input")
            .arg(&input_path)
            .arg("--output")
            .arg(&output_path)
            .assert()
            .success();

        let c = fs::read_to_string(&output_path).expect("read c");
        assert!(c.starts_with("#include <stdio.h>\n"));
        assert!(c.contains("float x;\nx = 5;\n"));
        assert!(c.contains("printf(\"%.2f\\n\", (float) (x));"));
    }

    #[test]
    fn reads_source_from_stdin() {
        let dir = tempdir().expect("tempdir");
        let output_path = dir.path().join("nested/out.c");

        Command::cargo_bin("teeny-cli")
            .expect("binary exists")
            .arg("--output")
            .arg(&output_path)
            .write_stdin("fn greet\nprint \"hi\"\nend\ngreet\n")
            .assert()
            .success();

        let c = fs::read_to_string(&output_path).expect("read c");
        assert!(c.contains("void greet() {"));
        assert!(c.contains("greet();"));
    }

    #[test]
    fn emits_token_listing() {
        let dir = tempdir().expect("tempdir");
        let output_path = dir.path().join("out.tokens");

        Command::cargo_bin("teeny-cli")
            .expect("binary exists")
            .arg("--output")
            .arg(&output_path)
            .arg("--emit")
            .arg("tokens")
            .write_stdin("goto top")
            .assert()
            .success();

        let listing = fs::read_to_string(&output_path).expect("read listing");
        assert!(listing.starts_with("GOTO     goto\nIDENT    top\n"));
    }

    #[test]
    fn rejects_unknown_format() {
        let dir = tempdir().expect("tempdir");
        let output_path = dir.path().join("out.asm");

        Command::cargo_bin("teeny-cli")
            .expect("binary exists")
            .arg("--output")
            .arg(&output_path)
            .arg("--emit")
            .arg("asm")
            .write_stdin("print 1")
            .assert()
            .failure()
            .stderr(predicate::str::contains("unsupported emit format: asm"));

        assert!(!output_path.exists());
    }

    #[test]
    fn reports_undeclared_label_and_writes_nothing() {
        let dir = tempdir().expect("tempdir");
        let input_path = dir.path().join("input.teeny");
        fs::write(&input_path, "goto nowhere\n").expect("write input");
        let output_path = dir.path().join("out.c");

        Command::cargo_bin("teeny-cli")
            .expect("binary exists")
            .arg("--input")
            .arg(&input_path)
            .arg("--output")
            .arg(&output_path)
            .assert()
            .failure()
            .stderr(predicate::str::contains(
                "attempting to go to undeclared label: nowhere",
            ));

        assert!(!output_path.exists(), "failed translation must not be written");
    }

    #[test]
    fn reports_missing_input_file() {
        let dir = tempdir().expect("tempdir");

        Command::cargo_bin("teeny-cli")
            .expect("binary exists")
            .arg("--input")
            .arg(dir.path().join("missing.teeny"))
            .arg("--output")
            .arg(dir.path().join("out.c"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to read input file"));
    }

    #[test]
    fn translates_directory() {
        let dir = tempdir().expect("tempdir");
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("nested")).expect("create src");
        fs::write(src.join("a.teeny"), "print 1\n").expect("write a");
        fs::write(src.join("nested/b.teeny"), "label l\ngoto l\n").expect("write b");
        let out = dir.path().join("out");

        Command::cargo_bin("teeny-cli")
            .expect("binary exists")
            .arg("--input-dir")
            .arg(&src)
            .arg("--output")
            .arg(&out)
            .arg("--verbose")
            .assert()
            .success()
            .stderr(predicate::str::contains("translated 2 file(s)"));

        assert!(out.join("a.c").exists());
        let b = fs::read_to_string(out.join("nested/b.c")).expect("read b");
        assert!(b.contains("l:;\ngoto l;\n"));
    }

    #[test]
    fn directory_with_bad_program_writes_nothing() {
        let dir = tempdir().expect("tempdir");
        let src = dir.path().join("src");
        fs::create_dir_all(&src).expect("create src");
        fs::write(src.join("a.teeny"), "print 1\n").expect("write a");
        fs::write(src.join("b.teeny"), "print y\n").expect("write b");
        let out = dir.path().join("out");

        Command::cargo_bin("teeny-cli")
            .expect("binary exists")
            .arg("--input-dir")
            .arg(&src)
            .arg("--output")
            .arg(&out)
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to translate b.teeny"))
            .stderr(predicate::str::contains(
                "referencing variable before assignment: y",
            ));

        assert!(!out.exists());
    }

    #[test]
    fn input_and_input_dir_conflict() {
        let dir = tempdir().expect("tempdir");

        Command::cargo_bin("teeny-cli")
            .expect("binary exists")
            .arg("--input")
            .arg(dir.path().join("a.teeny"))
            .arg("--input-dir")
            .arg(dir.path())
            .arg("--output")
            .arg(dir.path().join("out"))
            .assert()
            .failure();
    }

    #[test]
    fn reports_missing_c_compiler() {
        let dir = tempdir().expect("tempdir");
        let output_path = dir.path().join("out.c");

        Command::cargo_bin("teeny-cli")
            .expect("binary exists")
            .arg("--output")
            .arg(&output_path)
            .arg("--cc")
            .arg(dir.path().join("no-such-cc"))
            .write_stdin("print 1\n")
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to invoke C compiler"));

        assert!(output_path.exists(), "C output is written before the build step");
    }

    #[test]
    fn executable_path_strips_extension() {
        assert_eq!(executable_path(Path::new("dir/prog.c")), PathBuf::from("dir/prog"));
        assert_eq!(executable_path(Path::new("prog")), PathBuf::from("prog.out"));
    }

    fn system_cc_available() -> bool {
        std::process::Command::new("cc")
            .arg("--version")
            .output()
            .is_ok_and(|output| output.status.success())
    }

    #[test]
    fn builds_and_runs_translated_program() {
        if !system_cc_available() {
            eprintln!("skipping: no `cc` on PATH");
            return;
        }

        let dir = tempdir().expect("tempdir");
        let input_path = dir.path().join("input.teeny");
        fs::write(&input_path, "let x = 5\nprint x\n").expect("write input");
        let output_path = dir.path().join("prog.c");

        Command::cargo_bin("teeny-cli")
            .expect("binary exists")
            .arg("--input")
            .arg(&input_path)
            .arg("--output")
            .arg(&output_path)
            .arg("--cc")
            .arg("cc")
            .arg("--verbose")
            .assert()
            .success()
            .stderr(predicate::str::contains("built"));

        let executable = dir.path().join("prog");
        let run = std::process::Command::new(&executable)
            .output()
            .expect("run translated program");
        assert!(run.status.success());
        assert_eq!(String::from_utf8_lossy(&run.stdout), "5.00\n");
    }

    #[test]
    fn reports_unreadable_source_directory() {
        let dir = tempdir().expect("tempdir");

        Command::cargo_bin("teeny-cli")
            .expect("binary exists")
            .arg("--input-dir")
            .arg(dir.path().join("missing"))
            .arg("--output")
            .arg(dir.path().join("out"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to scan source directory"))
            .stderr(predicate::str::contains("failed to read source"));
    }
}

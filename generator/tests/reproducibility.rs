// Reproducibility tests at the binary level.
//
// Verify that the generator produces byte-identical outputs for identical
// inputs, surfaces failures through exit codes, and never leaves partial
// output behind on a failed run.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const OUTPUT_FILES: [&str; 4] = [
    "builtins_impl.h",
    "builtins_def.h",
    "stdlib_def.h",
    "stdlib_impl.h",
];

const SAMPLE: &str = "\
def vecf : float2 float4
def gentype : float $vecf

native $type add $gentype : a:$type b:$type
    return a + b;
end

func $type max $gentype : a:$type b:$type
    return (a > b) ? a : b;
end
";

fn blgen_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_blgen"))
}

/// Fresh, empty scratch directory under the system temp dir.
fn scratch_dir(label: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("blgen_test_{}_{}", std::process::id(), label));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn run_blgen(def_file: &Path, out_dir: &Path) -> Output {
    Command::new(blgen_binary())
        .arg(def_file)
        .arg(out_dir)
        .output()
        .expect("failed to run blgen")
}

fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&digest);
    hash
}

#[test]
fn same_input_identical_output() {
    let work = scratch_dir("identical");
    let def_file = work.join("sample.def");
    std::fs::write(&def_file, SAMPLE).unwrap();
    let out_first = scratch_dir("identical_first");
    let out_second = scratch_dir("identical_second");

    let first = run_blgen(&def_file, &out_first);
    let second = run_blgen(&def_file, &out_second);
    assert!(first.status.success(), "first run failed");
    assert!(second.status.success(), "second run failed");

    for name in OUTPUT_FILES {
        let a = std::fs::read(out_first.join(name)).unwrap();
        let b = std::fs::read(out_second.join(name)).unwrap();
        assert_eq!(a, b, "{name} differs between runs");
        assert_eq!(sha256(&a), sha256(&b));
    }

    let _ = std::fs::remove_dir_all(&work);
    let _ = std::fs::remove_dir_all(&out_first);
    let _ = std::fs::remove_dir_all(&out_second);
}

#[test]
fn malformed_input_exits_one_and_writes_nothing() {
    let work = scratch_dir("malformed");
    let def_file = work.join("bad.def");
    std::fs::write(&def_file, "fnc float broken float : x:float\nend\n").unwrap();
    let out_dir = scratch_dir("malformed_out");

    let output = run_blgen(&def_file, &out_dir);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown directive"), "stderr: {stderr}");

    // All-or-nothing: a failed run leaves the output directory untouched.
    let leftovers = std::fs::read_dir(&out_dir).unwrap().count();
    assert_eq!(leftovers, 0, "partial output was written");

    let _ = std::fs::remove_dir_all(&work);
    let _ = std::fs::remove_dir_all(&out_dir);
}

#[test]
fn undefined_reference_exits_one() {
    let work = scratch_dir("undefined");
    let def_file = work.join("bad.def");
    std::fs::write(&def_file, "func $type f $gentype : x:$type\nend\n").unwrap();
    let out_dir = scratch_dir("undefined_out");

    let output = run_blgen(&def_file, &out_dir);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("$gentype"), "stderr: {stderr}");

    let _ = std::fs::remove_dir_all(&work);
    let _ = std::fs::remove_dir_all(&out_dir);
}

#[test]
fn missing_input_exits_two() {
    let out_dir = scratch_dir("missing_out");
    let output = run_blgen(Path::new("/nonexistent/blgen/input.def"), &out_dir);
    assert_eq!(output.status.code(), Some(2));
    let _ = std::fs::remove_dir_all(&out_dir);
}

#[test]
fn missing_output_directory_exits_two() {
    let work = scratch_dir("nodir");
    let def_file = work.join("sample.def");
    std::fs::write(&def_file, SAMPLE).unwrap();

    let out_dir = work.join("does_not_exist");
    let output = run_blgen(&def_file, &out_dir);
    assert_eq!(output.status.code(), Some(2));

    let _ = std::fs::remove_dir_all(&work);
}

#[test]
fn rerun_replaces_prior_content() {
    let work = scratch_dir("replace");
    let def_file = work.join("sample.def");
    std::fs::write(&def_file, SAMPLE).unwrap();
    let out_dir = scratch_dir("replace_out");

    assert!(run_blgen(&def_file, &out_dir).status.success());
    let fresh = std::fs::read(out_dir.join("stdlib_def.h")).unwrap();

    // Corrupt one output, rerun, and expect it restored byte for byte.
    std::fs::write(out_dir.join("stdlib_def.h"), "stale garbage").unwrap();
    assert!(run_blgen(&def_file, &out_dir).status.success());
    let replaced = std::fs::read(out_dir.join("stdlib_def.h")).unwrap();
    assert_eq!(fresh, replaced);

    let _ = std::fs::remove_dir_all(&work);
    let _ = std::fs::remove_dir_all(&out_dir);
}

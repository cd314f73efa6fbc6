use std::{ffi::OsString, path::PathBuf, str::FromStr, sync::Arc};

use refnote::{Footnotes, NoteCatalog, Settings, SharedNote};

const CLEAR: &str = "\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n\n";
const INPUT_DIR: &str = "./tests/input_files";
const RENDER_DIR: &str = "./tests/rendered_files";

fn input_files() -> impl Iterator<Item = (OsString, String)> {
    let mut files: Vec<_> = std::fs::read_dir(INPUT_DIR)
        .expect("Should be able to access input directory")
        .map(|file| {
            file.expect("Should be able to access files in input directory")
                .path()
        })
        .collect();
    files.sort();
    files.into_iter().map(|file_path| {
        let input =
            std::fs::read_to_string(&file_path).expect("Should be able to read input files");
        let filename = file_path
            .file_name()
            .expect("Input files should have names")
            .to_owned();
        (filename, input)
    })
}

fn catalog() -> Arc<NoteCatalog> {
    Arc::new(NoteCatalog::with_provider(&|| {
        vec![
            SharedNote::new("x", "Hello"),
            SharedNote::new("src", "<cite>Source</cite>"),
        ]
    }))
}

/// Every input file is a separate post #1 of a fresh request
fn render(input: &str) -> String {
    Footnotes::new(catalog(), Settings::default()).render_post(1, input, None)
}

/// Prints rendered input files into the stdout, for inspection
#[ignore = "manual"]
#[test]
fn show_render() {
    for (filename, input) in input_files() {
        println!("{}:\n{}", filename.to_string_lossy(), render(&input));
        std::io::stdin()
            .read_line(&mut String::new())
            .expect("Should be able to read a line");
        println!("{}", CLEAR);
    }
}

#[test]
fn test_render() {
    let mut output_results = Vec::new();
    let mut output_path = PathBuf::from_str(RENDER_DIR).expect("Path is valid");
    for (filename, input) in input_files() {
        let repr = render(&input);
        let expected_output = {
            output_path.push(&filename);
            output_path.set_extension("html");
            let output =
                std::fs::read_to_string(&output_path).expect("Failed to read expected output");
            output_path.pop();
            output
        };
        output_results.push((filename, repr, expected_output));
    }
    assert!(!output_results.is_empty(), "There should be input files");
    let total = output_results.len();
    let matches = |real: &str, expected: &str| real.trim_end() == expected.trim_end();
    let success = output_results
        .iter()
        .filter(|(_, real, expected)| matches(real, expected))
        .count();
    let failed = total - success;
    if failed > 0 {
        let mut output_msg = String::new();
        output_msg.push_str(&format!("passed: ({success}/{total})\nFailures:\n"));
        for (filename, real, expected) in output_results {
            if !matches(&real, &expected) {
                output_msg.push_str(&format!(
                    "\tFilename: {}\n\tActual: {real}\n\tExpected: {expected}\n\n",
                    filename.to_string_lossy(),
                ));
            }
        }
        panic!("{output_msg}");
    }
}

#[test]
fn markers_are_found_in_every_input() {
    for (filename, input) in input_files() {
        assert!(
            refnote::markers(&input).next().is_some(),
            "{} should contain markers",
            filename.to_string_lossy()
        );
    }
}

use std::{path::PathBuf, sync::Arc};

use refnote::{Footnotes, NoteCatalog, Settings, SharedNote};

fn main() {
    //! This is a simple example of a single post rendering
    //!
    //! Run with `RUST_LOG=refnote=trace` to see what happens to every marker

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // read the input
    let mut workpath = PathBuf::from("demos/render_post");
    workpath.push("input.txt");
    let input = std::fs::read_to_string(&workpath).expect("Should be able to read demo input");

    // shared notes come from the host; catalog loads them once
    let catalog = NoteCatalog::with_provider(&|| {
        vec![SharedNote::new(
            "style",
            "Shared notes are referenced by <code>id</code>.",
        )]
    });

    // one instance per request; every post or comment is a separate pass
    let mut footnotes = Footnotes::new(Arc::new(catalog), Settings::default());
    let output = footnotes.render_post(1, &input, None);

    println!("{output}");
}

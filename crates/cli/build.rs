use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("contextprompt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Capture prompt-ready context from rendered HTML pages")
        .arg(clap::arg!([INPUT] "Saved HTML file, or '-' for stdin (default: stdin)"))
        .arg(clap::arg!(-u --url <URL> "URL the page was rendered from; enables chat platform detection"))
        .arg(
            clap::arg!(-d --depth <DEPTH> "Capture depth (light, standard, deep)")
                .default_value("standard")
                .value_parser(["light", "standard", "deep"]),
        )
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (markdown, chat, json)")
                .default_value("markdown")
                .value_parser(["markdown", "chat", "json"]),
        )
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--selection <TEXT> "Text the user had selected on the page (JSON output only)"))
        .arg(
            clap::arg!(--platforms <FILE> "Platform table overriding the built-in chat platforms")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--"no-images" "Drop image placeholders from Markdown"))
        .arg(clap::arg!(--"no-links" "Keep link text but drop link targets from Markdown"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"))
        .arg(
            clap::arg!(--completions <SHELL> "Generate shell completion script and exit")
                .value_parser(["bash", "elvish", "fish", "powershell", "zsh"]),
        );

    for shell in [
        clap_complete::Shell::Bash,
        clap_complete::Shell::Zsh,
        clap_complete::Shell::Fish,
        clap_complete::Shell::PowerShell,
    ] {
        clap_complete::generate_to(shell, &mut cmd, "contextprompt", &completions_dir).unwrap();
    }

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}

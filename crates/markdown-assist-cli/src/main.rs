use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use markdown_assist_config::Config;
use markdown_assist_engine::{
    Cmd, CompletionContext, ExportOptions, ImageMode, Position, Selection, TextDocument,
    TocOptions, apply_edits, build_toc, compile_command, complete, export_html, print_to_html,
    read_bytes, update_toc, write_file,
};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "markdown-assist")]
#[command(about = "Markdown authoring helpers: style toggles, TOC, completion, HTML export", long_about = None)]
struct Args {
    /// Config file to use instead of ~/.config/markdown-assist/config.toml
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Apply a formatting command at one or more selections
    Toggle {
        file: PathBuf,
        #[arg(value_enum)]
        action: Action,
        /// LINE:COL or LINE:COL-LINE:COL, zero-based; repeatable, first is primary
        #[arg(short = 's', long = "selection", value_parser = parse_selection)]
        selections: Vec<Selection>,
        /// Clipboard text for paste-link
        #[arg(long)]
        clipboard: Option<String>,
        /// Print the edit batch as JSON instead of the edited text
        #[arg(long, conflicts_with = "write")]
        json: bool,
        /// Save the result back to the file
        #[arg(short = 'w', long)]
        write: bool,
    },
    /// Insert or refresh the marked table of contents
    Toc {
        file: PathBuf,
        /// Where a new TOC goes when the document has none
        #[arg(long, value_parser = parse_position, default_value = "0:0")]
        cursor: Position,
        /// Print the heading entries as JSON instead
        #[arg(long, conflicts_with = "write")]
        json: bool,
        #[arg(short = 'w', long)]
        write: bool,
    },
    /// List completion items at a position as JSON
    Complete {
        file: PathBuf,
        #[arg(value_parser = parse_position)]
        position: Position,
    },
    /// Export the document to a standalone HTML page
    Export {
        file: PathBuf,
        /// Defaults to the source path with an .html extension
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Action {
    Bold,
    Italic,
    Code,
    Strikethrough,
    Math,
    MathReverse,
    HeadingUp,
    HeadingDown,
    List,
    PasteLink,
}

fn parse_position(s: &str) -> Result<Position, String> {
    let (line, character) = s
        .split_once(':')
        .ok_or_else(|| format!("expected LINE:COL, got {s:?}"))?;
    let line = line
        .trim()
        .parse()
        .map_err(|e| format!("bad line in {s:?}: {e}"))?;
    let character = character
        .trim()
        .parse()
        .map_err(|e| format!("bad column in {s:?}: {e}"))?;
    Ok(Position::new(line, character))
}

fn parse_selection(s: &str) -> Result<Selection, String> {
    match s.split_once('-') {
        Some((anchor, active)) => Ok(Selection::new(
            parse_position(anchor)?,
            parse_position(active)?,
        )),
        None => parse_position(s).map(Selection::cursor),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        return Config::load_from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?
            .with_context(|| format!("Config file {} does not exist", path.display()));
    }

    match Config::load()? {
        Some(config) => Ok(config),
        None => {
            log::debug!(
                "no config at {}, using defaults",
                Config::config_path().display()
            );
            Ok(Config::default())
        }
    }
}

fn toc_options(config: &Config) -> TocOptions {
    let (min, max) = config.toc.level_bounds().unwrap_or((1, 6));
    TocOptions {
        levels: min..=max,
        ordered_list: config.toc.ordered_list,
        plaintext: config.toc.plaintext,
        tab_size: config.toc.tab_size,
    }
}

fn export_options(config: &Config) -> ExportOptions {
    let image_mode = if config.print.img_to_base64 {
        ImageMode::Base64
    } else if config.print.absolute_img_path {
        ImageMode::Absolute
    } else {
        ImageMode::Keep
    };
    ExportOptions {
        breaks: config.preview.breaks,
        image_mode,
        styles: config.preview.styles.clone(),
        font_family: config.preview.font_family.clone(),
        font_size: config.preview.font_size,
        line_height: config.preview.line_height,
    }
}

fn command_for(action: Action, config: &Config, clipboard: Option<String>) -> Result<Cmd> {
    Ok(match action {
        Action::Bold => Cmd::ToggleBold,
        Action::Italic => Cmd::ToggleItalic {
            indicator: config.italic.indicator.as_str().to_string(),
        },
        Action::Code => Cmd::ToggleCodeSpan,
        Action::Strikethrough => Cmd::ToggleStrikethrough,
        Action::Math => Cmd::ToggleMath { reverse: false },
        Action::MathReverse => Cmd::ToggleMath { reverse: true },
        Action::HeadingUp => Cmd::ToggleHeadingUp,
        Action::HeadingDown => Cmd::ToggleHeadingDown,
        Action::List => Cmd::ToggleUnorderedList,
        Action::PasteLink => match clipboard {
            Some(clipboard) => Cmd::PasteLink { clipboard },
            None => bail!("paste-link needs --clipboard"),
        },
    })
}

fn load_document(file: &Path) -> Result<TextDocument> {
    let bytes = read_bytes(file).with_context(|| format!("Failed to read {}", file.display()))?;
    TextDocument::from_bytes(&bytes)
        .with_context(|| format!("{} is not UTF-8 text", file.display()))
}

/// Save or print the edited document.
fn emit(file: &Path, doc: &TextDocument, write: bool) -> Result<()> {
    if write {
        write_file(file, &doc.text())
            .with_context(|| format!("Failed to write {}", file.display()))?;
        log::info!("wrote {}", file.display());
    } else {
        print!("{}", doc.text());
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Commands::Toggle {
            file,
            action,
            mut selections,
            clipboard,
            json,
            write,
        } => {
            let doc = load_document(&file)?;
            if selections.is_empty() {
                selections.push(Selection::cursor(Position::default()));
            }
            let cmd = command_for(action, &config, clipboard)?;
            let Some(batch) = compile_command(&doc, &selections, &cmd) else {
                log::info!("{action:?} does not apply at the given selection");
                if !json && !write {
                    print!("{}", doc.text());
                }
                return Ok(());
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&batch)?);
                return Ok(());
            }
            let edited = batch.apply(&doc)?;
            emit(&file, &edited, write)
        }
        Commands::Toc {
            file,
            cursor,
            json,
            write,
        } => {
            let doc = load_document(&file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&build_toc(&doc))?);
                return Ok(());
            }
            match update_toc(&doc, &toc_options(&config), cursor) {
                Some(edit) => emit(&file, &apply_edits(&doc, &[edit])?, write),
                None => {
                    log::info!("table of contents is up to date");
                    if !write {
                        print!("{}", doc.text());
                    }
                    Ok(())
                }
            }
        }
        Commands::Complete { file, position } => {
            let doc = load_document(&file)?;
            let context = CompletionContext {
                doc_dir: file.parent().map(Path::to_path_buf),
            };
            let items = complete(&doc, position, &context);
            println!("{}", serde_json::to_string_pretty(&items)?);
            Ok(())
        }
        Commands::Export { file, output } => {
            let options = export_options(&config);
            let written = match output {
                Some(output) => {
                    let doc = load_document(&file)?;
                    let html = export_html(&doc, &file, &options)?;
                    write_file(&output, &html)
                        .with_context(|| format!("Failed to write {}", output.display()))?;
                    output
                }
                None => print_to_html(&file, &options)
                    .with_context(|| format!("Failed to export {}", file.display()))?,
            };
            println!("{}", written.display());
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    run(Args::parse())
}

#[cfg(test)]
mod tests {
    use super::*;
    use markdown_assist_config::ItalicIndicator;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write_doc(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn run_args(argv: &[&str]) -> Result<()> {
        run(Args::try_parse_from(argv)?)
    }

    #[test]
    fn test_parse_position_and_selection() {
        assert_eq!(parse_position("3:7"), Ok(Position::new(3, 7)));
        assert!(parse_position("3").is_err());
        assert!(parse_position("a:1").is_err());

        assert_eq!(
            parse_selection("0:4"),
            Ok(Selection::cursor(Position::new(0, 4)))
        );
        // Anchor and active keep their order so reversed selections survive
        assert_eq!(
            parse_selection("1:5-0:2"),
            Ok(Selection::new(Position::new(1, 5), Position::new(0, 2)))
        );
    }

    #[test]
    fn test_toc_options_from_config() {
        let mut config = Config::default();
        config.toc.levels = "2..3".to_string();
        config.toc.ordered_list = true;
        config.toc.tab_size = 4;

        let options = toc_options(&config);

        assert_eq!(options.levels, 2..=3);
        assert!(options.ordered_list);
        assert!(!options.plaintext);
        assert_eq!(options.tab_size, 4);
    }

    #[test]
    fn test_export_image_mode_from_config() {
        let mut config = Config::default();
        assert_eq!(export_options(&config).image_mode, ImageMode::Absolute);

        config.print.absolute_img_path = false;
        assert_eq!(export_options(&config).image_mode, ImageMode::Keep);

        // base64 wins over the path setting
        config.print.img_to_base64 = true;
        assert_eq!(export_options(&config).image_mode, ImageMode::Base64);
    }

    #[test]
    fn test_italic_indicator_reaches_command() {
        let mut config = Config::default();
        config.italic.indicator = ItalicIndicator::Underscore;

        let cmd = command_for(Action::Italic, &config, None).unwrap();

        assert_eq!(
            cmd,
            Cmd::ToggleItalic {
                indicator: "_".to_string()
            }
        );
    }

    #[test]
    fn test_paste_link_requires_clipboard() {
        let err = command_for(Action::PasteLink, &Config::default(), None).unwrap_err();
        assert!(err.to_string().contains("--clipboard"));
    }

    #[test]
    fn test_toggle_bold_writes_file() {
        let dir = TempDir::new().unwrap();
        let config = write_doc(&dir, "config.toml", "");
        let file = write_doc(&dir, "note.md", "say hello world\n");

        run_args(&[
            "markdown-assist",
            "--config",
            config.to_str().unwrap(),
            "toggle",
            file.to_str().unwrap(),
            "bold",
            "-s",
            "0:6",
            "--write",
        ])
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(&file).unwrap(),
            "say **hello** world\n"
        );
    }

    #[test]
    fn test_toc_write_inserts_block() {
        let dir = TempDir::new().unwrap();
        let config = write_doc(&dir, "config.toml", "[toc]\nordered_list = true\n");
        let file = write_doc(&dir, "note.md", "\n# One\n## Two\n");

        run_args(&[
            "markdown-assist",
            "-c",
            config.to_str().unwrap(),
            "toc",
            file.to_str().unwrap(),
            "--write",
        ])
        .unwrap();

        assert_eq!(
            std::fs::read_to_string(&file).unwrap(),
            "<!-- toc -->\n\n1. [One](#one)\n  1. [Two](#two)\n\n<!-- /toc -->\n# One\n## Two\n"
        );
    }

    #[test]
    fn test_export_to_explicit_output() {
        let dir = TempDir::new().unwrap();
        let config = write_doc(&dir, "config.toml", "");
        let file = write_doc(&dir, "note.md", "# Title\n");
        let output = dir.path().join("out/page.html");

        run_args(&[
            "markdown-assist",
            "-c",
            config.to_str().unwrap(),
            "export",
            file.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
        ])
        .unwrap();

        let html = std::fs::read_to_string(&output).unwrap();
        assert!(html.contains(r#"<h1 id="title">Title</h1>"#));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let file = write_doc(&dir, "note.md", "text");
        let missing = dir.path().join("nope.toml");

        let err = run_args(&[
            "markdown-assist",
            "-c",
            missing.to_str().unwrap(),
            "toc",
            file.to_str().unwrap(),
        ])
        .unwrap_err();

        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_non_utf8_document_is_an_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("binary.md");
        std::fs::write(&file, [0x23, 0x20, 0xff, 0xfe]).unwrap();

        let err = load_document(&file).unwrap_err();

        assert!(err.to_string().contains("is not UTF-8 text"));
    }

    #[test]
    fn test_missing_document_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = write_doc(&dir, "config.toml", "");
        let missing = dir.path().join("missing.md");

        let err = run_args(&[
            "markdown-assist",
            "-c",
            config.to_str().unwrap(),
            "complete",
            missing.to_str().unwrap(),
            "0:0",
        ])
        .unwrap_err();

        assert!(err.to_string().contains("Failed to read"));
    }
}

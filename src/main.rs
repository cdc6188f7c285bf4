// src/main.rs
//
// onepass: render Markdown to HTML from the command line.
//
// - Reads INPUT, or stdin with --interactive or when no INPUT is given.
// - Without --template the HTML body is streamed to the output as it is
//   rendered.
// - With --template the body is wrapped in a page (built-in or from a file)
//   whose title comes from the first <h1>.
// - --serve renders the page once and answers every HTTP request with it.
//
// Logging goes to stderr through env_logger; set RUST_LOG to see more.

use clap::{ArgAction, Parser};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use onepass::page::{PageParts, Template, DEFAULT_CSS};
use onepass::{render, serve, Error, IoSink, RenderOptions, Renderer};

/// Value of --template that selects the built-in page.
const BUILTIN: &str = "default";

/// CLI flags
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Input file (stdin when absent)
    input: Option<PathBuf>,

    /// Read from stdin even when INPUT is given
    #[arg(short, long, action = ArgAction::SetTrue)]
    interactive: bool,

    /// Escape raw HTML and comments instead of passing them through
    #[arg(short, long = "no-html", action = ArgAction::SetTrue)]
    no_html: bool,

    /// Output file; stdout when absent or "-"
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Wrap the output in a page template; `-t` alone or `--template=default`
    /// picks the built-in one
    #[arg(
        short,
        long,
        value_name = "PATH",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = BUILTIN
    )]
    template: Option<PathBuf>,

    /// Stylesheet inlined into the page template
    #[arg(long, visible_alias = "stylesheet", value_name = "PATH")]
    css: Option<PathBuf>,

    /// Serve the rendered page over HTTP instead of writing it
    #[arg(short, long, action = ArgAction::SetTrue)]
    serve: bool,

    /// Port for --serve
    #[arg(short, long, default_value_t = 8080)]
    port: u16,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("onepass: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let src = read_input(cli)?;
    let options = RenderOptions { no_html: cli.no_html };

    if cli.serve {
        let page = build_page(cli, &src, options)?;
        return serve::serve(cli.port, &page);
    }

    if cli.template.is_some() {
        let page = build_page(cli, &src, options)?;
        return write_output(cli.output.as_deref(), |out| {
            out.write_all(&page)?;
            out.flush()
        });
    }

    // Plain body: stream straight into the destination.
    write_output(cli.output.as_deref(), |out| {
        let mut sink = IoSink::new(out);
        Renderer::new(&mut sink, options).render(&src);
        sink.finish().map(drop)
    })
}

fn read_input(cli: &Cli) -> Result<Vec<u8>, Error> {
    match &cli.input {
        Some(path) if !cli.interactive => {
            log::info!("reading {}", path.display());
            fs::read(path).map_err(|source| Error::ReadInput {
                path: path.clone(),
                source,
            })
        }
        _ => {
            log::info!("reading standard input");
            let mut src = Vec::new();
            io::stdin()
                .lock()
                .read_to_end(&mut src)
                .map_err(Error::ReadStdin)?;
            Ok(src)
        }
    }
}

fn is_builtin(path: &Path) -> bool {
    path.as_os_str() == BUILTIN
}

/// Render the document and wrap it in the selected template and stylesheet.
fn build_page(cli: &Cli, src: &[u8], options: RenderOptions) -> Result<Vec<u8>, Error> {
    let template = match cli.template.as_deref() {
        Some(path) if !is_builtin(path) => {
            let text = fs::read(path).map_err(|source| Error::ReadTemplate {
                path: path.to_path_buf(),
                source,
            })?;
            Template::parse(&text)?
        }
        _ => Template::builtin(),
    };

    let css = match cli.css.as_deref() {
        Some(path) if !is_builtin(path) => {
            fs::read(path).map_err(|source| Error::ReadStylesheet {
                path: path.to_path_buf(),
                source,
            })?
        }
        _ => DEFAULT_CSS.as_bytes().to_vec(),
    };

    let body = render(src, options);
    let page = template.fill(&PageParts::for_body(&body, &css));
    log::info!("page built: {} bytes of body, {} total", body.len(), page.len());
    Ok(page)
}

/// Run `write` against the output file, or stdout for none or "-".
fn write_output<F>(path: Option<&Path>, write: F) -> Result<(), Error>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    match path {
        Some(path) if path.as_os_str() != "-" => {
            let target = path.display().to_string();
            let file = File::create(path).map_err(|source| Error::WriteOutput {
                target: target.clone(),
                source,
            })?;
            let mut out = BufWriter::new(file);
            write(&mut out)
                .and_then(|()| out.flush())
                .map_err(|source| Error::WriteOutput { target, source })
        }
        _ => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write(&mut out).map_err(|source| Error::WriteOutput {
                target: "standard output".to_string(),
                source,
            })
        }
    }
}

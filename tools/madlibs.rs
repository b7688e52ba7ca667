//! madlibs - author, manage and play fill-in-the-blank stories from the terminal.
//!
//! Usage: madlibs [--config <file>] [--library <file>] [-v] <command>
//!
//! Commands:
//!   list                       - list stored templates
//!   show <title>               - print a template and its placeholders
//!   extract [file]             - list the placeholders of a text (stdin if no file)
//!   save --title <t> [file]    - store a template, replacing one with the same title
//!   rename <from> <to>         - rename a stored template
//!   delete <title> [--yes]     - delete a stored template
//!   play [title]               - fill in the blanks and print the story
//!   examples [--install]       - list or install the built-in examples
//!   import <file> [--save]     - read a single template file
//!   generate --theme <text>    - ask an external command for a new template
//!   save-as <file>             - write the library to a new file

use clap::{Parser, Subcommand};
use log::debug;
use madlib_engine::core::config::Config;
use madlib_engine::core::generation::{
    Complexity, GenerationError, GenerationRequest, Style, EXAMPLE_THEMES,
};
use madlib_engine::core::library::Upserted;
use madlib_engine::core::session::{Draft, Session};
use madlib_engine::genre_templates;
use madlib_engine::schema::fill::FillIn;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::error::Error;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{self, Command as Process, Stdio};

#[derive(Parser)]
#[command(name = "madlibs", about = "Create, manage and play Mad Libs", version)]
struct Cli {
    /// Path to a RON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Library file (overrides the config)
    #[arg(short, long, global = true)]
    library: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List stored templates
    List {
        /// List another library file instead (it must exist and parse)
        #[arg(long)]
        from: Option<PathBuf>,
    },

    /// Print a stored template
    Show { title: String },

    /// List the placeholders found in a text
    Extract {
        /// Text file to scan; reads stdin when omitted
        file: Option<PathBuf>,
    },

    /// Store a template, replacing any template with the same title
    Save {
        #[arg(short, long)]
        title: String,

        /// Template text file; reads stdin when omitted
        file: Option<PathBuf>,
    },

    /// Rename a stored template
    Rename { from: String, to: String },

    /// Delete a stored template
    Delete {
        title: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Fill in the blanks and print the finished story
    Play {
        /// Template title; required unless --random is given
        title: Option<String>,

        /// Pre-filled value as name=value (repeatable)
        #[arg(short = 's', long = "set", value_name = "NAME=VALUE")]
        values: Vec<String>,

        /// Pick a template at random
        #[arg(long)]
        random: bool,

        /// RNG seed for --random
        #[arg(long)]
        seed: Option<u64>,
    },

    /// List or install the built-in example stories
    Examples {
        /// Add examples missing from the library
        #[arg(long)]
        install: bool,
    },

    /// Read a single {title, template, placeholders} JSON file
    Import {
        file: PathBuf,

        /// Store it in the library
        #[arg(long)]
        save: bool,
    },

    /// Ask an external command to write a template
    Generate {
        /// What the story should be about
        #[arg(long)]
        theme: Option<String>,

        #[arg(long, default_value = "funny")]
        style: Style,

        #[arg(long, default_value = "medium")]
        complexity: Complexity,

        /// Shell command that reads the prompt on stdin and prints JSON (overrides the config)
        #[arg(long)]
        command: Option<String>,

        /// Store the result in the library
        #[arg(long)]
        save: bool,
    },

    /// Write the library to a new file
    SaveAs { file: PathBuf },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(cli) {
        eprintln!("ERROR: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = Config::load(cli.config.as_deref())?;
    let library_path = cli.library.clone().unwrap_or_else(|| config.library_path());
    debug!("library: {}", library_path.display());

    let mut builder = Session::builder()
        .config(&config)
        .library_path(library_path);

    let generator_command = match &cli.command {
        Command::Generate { command, .. } => command.clone().or(config.generator_command.clone()),
        _ => None,
    };
    if let Some(command) = generator_command {
        builder = builder.with_generator(command_generator(command));
    }

    let mut session = builder.build();

    match cli.command {
        Command::List { from } => {
            if let Some(path) = from {
                session.open(&path)?;
            }
            cmd_list(&session);
        }
        Command::Show { title } => {
            let record = session
                .find(&title)
                .ok_or_else(|| format!("no template titled '{}'", title))?;
            println!("{}\n", record.title);
            println!("{}\n", record.body);
            println!("Placeholders: {}", record.placeholders.join(", "));
        }
        Command::Extract { file } => {
            let text = read_input(file.as_deref())?;
            let placeholders = session.extract(&text)?;
            println!("Found {} unique placeholders.", placeholders.len());
            for p in placeholders {
                println!("  [{}]", p);
            }
        }
        Command::Save { title, file } => {
            let text = read_input(file.as_deref())?;
            session.set_title(&title);
            session.extract(&text)?;
            let outcome = session.save_draft()?;
            report_save(&session, outcome);
        }
        Command::Rename { from, to } => {
            session.rename(&from, &to)?;
            println!("Renamed '{}' to '{}'", from, to.trim());
        }
        Command::Delete { title, yes } => {
            if session.find(&title).is_none() {
                return Err(format!("no template titled '{}'", title).into());
            }
            if !yes && !confirm(&format!("Are you sure you want to delete '{}'?", title))? {
                println!("Cancelled.");
                return Ok(());
            }
            session.delete(&title)?;
            println!("Deleted '{}'", title);
        }
        Command::Play {
            title,
            values,
            random,
            seed,
        } => cmd_play(&session, title, &values, random, seed)?,
        Command::Examples { install } => {
            if install {
                let added = session.install_examples()?;
                println!("Added {} example templates.", added);
            } else {
                cmd_examples();
            }
        }
        Command::Import { file, save } => {
            print_draft(session.import_template(&file)?);
            if save {
                let outcome = session.save_draft()?;
                report_save(&session, outcome);
            }
        }
        Command::Generate {
            theme,
            style,
            complexity,
            save,
            ..
        } => {
            let theme = match theme {
                Some(theme) => theme,
                None => {
                    println!("Example themes:");
                    for example in EXAMPLE_THEMES {
                        println!("  {}", example);
                    }
                    prompt_line("Theme")?
                }
            };
            let request = GenerationRequest::new(theme)
                .style(style)
                .complexity(complexity);
            print_draft(session.generate(&request)?);
            if save {
                let outcome = session.save_draft()?;
                report_save(&session, outcome);
            }
        }
        Command::SaveAs { file } => {
            session.save_as(&file)?;
            println!(
                "Saved {} templates to {}",
                session.library().len(),
                file.display()
            );
        }
    }

    Ok(())
}

fn report_save(session: &Session, outcome: Upserted) {
    let title = &session.draft().title;
    match outcome {
        Upserted::Inserted => println!("Saved new Mad Lib: {}", title),
        Upserted::Replaced => println!("Updated Mad Lib: {}", title),
    }
}

fn cmd_list(session: &Session) {
    if session.library().is_empty() {
        println!("No templates yet. Try 'madlibs examples --install'.");
        return;
    }
    for record in session.library().records() {
        println!(
            "{} ({} placeholders)",
            record.title,
            record.placeholders.len()
        );
    }
}

fn cmd_examples() {
    for id in genre_templates::ids() {
        match genre_templates::load(id) {
            Some(Ok(record)) => {
                println!("{} - \"{}\"", genre_templates::display_name(id), record.title);
                println!("    {}", record.preview(genre_templates::PREVIEW_CHARS));
            }
            Some(Err(e)) => println!("{} - could not load: {}", id, e),
            None => {}
        }
    }
}

fn cmd_play(
    session: &Session,
    title: Option<String>,
    values: &[String],
    random: bool,
    seed: Option<u64>,
) -> Result<(), Box<dyn Error>> {
    let title = match (title, random) {
        (Some(title), _) => title,
        (None, true) => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            session
                .library()
                .choose(&mut rng)
                .map(|r| r.title.clone())
                .ok_or("the library is empty")?
        }
        (None, false) => return Err("give a title or --random".into()),
    };

    let mut fill = session.start_play(&title)?;
    for pair in values {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", pair))?;
        if !fill.set(name, value) {
            eprintln!("WARNING: '{}' has no [{}] blank", title, name);
        }
    }

    println!("{}\n", title);
    ask_missing(&mut fill)?;

    let story = session.render(&title, &fill)?;
    println!("\n--- Your Mad Lib Story ---");
    println!("{}", story);
    println!("--- End ---");
    Ok(())
}

/// Prompt on stdin for every blank still empty.
fn ask_missing(fill: &mut FillIn) -> Result<(), Box<dyn Error>> {
    for name in fill.missing() {
        loop {
            let label = if name.is_empty() { "(blank)" } else { name.as_str() };
            let value = prompt_line(&label.replace('_', " "))?;
            if fill.set(&name, &value) && fill.get(&name).is_some_and(|v| !v.is_empty()) {
                break;
            }
            println!("Please fill in all the blanks.");
        }
    }
    Ok(())
}

fn print_draft(draft: &Draft) {
    println!("Title: {}\n", draft.title);
    println!("Template:\n{}\n", draft.body);
    println!("Placeholders:\n{}", draft.placeholders.join(", "));
}

fn read_input(file: Option<&Path>) -> io::Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path),
        _ => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn prompt_line(label: &str) -> Result<String, Box<dyn Error>> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Err("unexpected end of input".into());
    }
    Ok(line.trim().to_string())
}

fn confirm(question: &str) -> Result<bool, Box<dyn Error>> {
    let answer = prompt_line(&format!("{} [y/N]", question))?;
    Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
}

/// A generator that pipes the prompt into `sh -c <command>` and returns its stdout.
fn command_generator(
    command: String,
) -> impl Fn(&GenerationRequest) -> Result<String, GenerationError> {
    move |request: &GenerationRequest| {
        let failed = |e: &dyn std::fmt::Display| GenerationError::Collaborator(e.to_string());

        let mut child = Process::new("sh")
            .arg("-c")
            .arg(&command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| failed(&e))?;

        if let Some(mut stdin) = child.stdin.take() {
            let prompt = format!("{}\n{}\n", request.system_prompt(), request.theme);
            stdin.write_all(prompt.as_bytes()).map_err(|e| failed(&e))?;
        }

        let output = child.wait_with_output().map_err(|e| failed(&e))?;
        if !output.status.success() {
            return Err(failed(&format!("'{}' exited with {}", command, output.status)));
        }
        String::from_utf8(output.stdout).map_err(|e| failed(&e))
    }
}

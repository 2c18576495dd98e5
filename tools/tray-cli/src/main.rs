use std::path::Path;

use clap::{ArgAction, Parser, Subcommand};
use common::{hex_with, OutputBuffer};
use icon_stream::{DecodeOptions, ICON_STREAM_KEY, ICON_STREAM_VALUE};
use menu_template::{EncodeOptions, MenuItem, MenuItemKind, ParsedItem};
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Deserialize;
use tray_guid::Guid;

#[derive(Parser, Debug)]
#[command(name = "Tray CLI")]
#[command(about, author, version, long_about = None)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encode a JSON menu description into a binary menu template
    #[command(arg_required_else_help = true)]
    Menu {
        /// JSON file holding an array of menu items
        file: String,
        /// Output file for the template
        #[arg(short, long, value_name = "FILE")]
        out: Option<String>,
        /// Overwrite files
        #[arg(short, long, default_value_t = false)]
        force: bool,
        /// Print the template as hex instead of writing it
        #[arg(long, default_value_t = false)]
        hex: bool,
    },
    /// Print the item tree of a binary menu template
    #[command(arg_required_else_help = true)]
    MenuDump {
        /// Binary menu template
        file: String,
    },
    /// Print the decoded contents of a raw icon-stream buffer
    #[command(arg_required_else_help = true)]
    IconStream {
        /// Raw bytes of the "IconStreams" registry value
        file: String,
        /// Rotation the text fields are stored with
        #[arg(short, long, default_value_t = 13)]
        rotation: u8,
    },
    /// Apply the letter-rotation cipher to a string
    #[command(arg_required_else_help = true)]
    Rot {
        text: String,
        #[arg(short, long, default_value_t = 13)]
        rotation: u8,
    },
    /// Validate and normalise a notify-icon GUID
    #[command(arg_required_else_help = true)]
    Guid { value: String },
}

/// Menu item as written in the JSON description. A present `items` array
/// makes the entry a submenu.
#[derive(Deserialize, Debug)]
struct MenuItemJson {
    #[serde(default)]
    id: u32,
    #[serde(default)]
    text: String,
    #[serde(default)]
    separator: bool,
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    checked: bool,
    #[serde(default)]
    items: Option<Vec<MenuItemJson>>,
}

impl From<MenuItemJson> for MenuItem {
    fn from(value: MenuItemJson) -> Self {
        let kind = match value.items {
            None => MenuItemKind::Leaf,
            Some(items) => MenuItemKind::Submenu(items.into_iter().map(MenuItem::from).collect()),
        };
        MenuItem {
            id: value.id,
            text: value.text,
            separator: value.separator,
            disabled: value.disabled,
            checked: value.checked,
            kind,
        }
    }
}

pub fn main() -> Result<()> {
    let stdout = console::Term::stdout();
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Menu {
            file,
            out,
            force,
            hex,
        } => command_menu(stdout, file, out, force, hex)?,
        Commands::MenuDump { file } => command_menu_dump(stdout, file)?,
        Commands::IconStream { file, rotation } => command_icon_stream(stdout, file, rotation)?,
        Commands::Rot { text, rotation } => command_rot(stdout, text, rotation)?,
        Commands::Guid { value } => command_guid(stdout, value)?,
    }

    Ok(())
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn command_menu(
    stdout: console::Term,
    file: String,
    out: Option<String>,
    force: bool,
    hex: bool,
) -> Result<()> {
    let data = std::fs::read_to_string(&file).into_diagnostic()?;
    let list: Vec<MenuItemJson> = serde_json::from_str(&data)
        .into_diagnostic()
        .wrap_err_with(|| format!("\"{file}\" is not a JSON array of menu items"))?;
    let items: Vec<MenuItem> = list.into_iter().map(MenuItem::from).collect();
    let mut template = Vec::new();
    menu_template::encode_template_into(&items, &EncodeOptions::default(), &mut template)?;

    if hex || out.is_none() {
        for (row, chunk) in template.chunks(16).enumerate() {
            let text = format!("{:08x}  {}", row * 16, hex_with(chunk, " "));
            stdout.write_line(&text).into_diagnostic()?;
        }
    }

    if let Some(path) = out {
        if !force && is_exist_file(&path) {
            let message = format!("File \"{}\" exists. Overwrite it?", path);

            if !dialoguer::Confirm::new()
                .with_prompt(message)
                .interact()
                .into_diagnostic()?
            {
                return Ok(());
            }
        }

        let mut file = std::fs::File::create(&path).into_diagnostic()?;
        file.write_exact(&template).into_diagnostic()?;
        let text = format!("Wrote {} bytes to \"{}\"", template.len(), path);
        stdout.write_line(&text).into_diagnostic()?;
    }

    Ok(())
}

fn command_menu_dump(stdout: console::Term, file: String) -> Result<()> {
    let bytes = std::fs::read(&file).into_diagnostic()?;
    let menu = menu_template::parse_template(&bytes)?;

    let text = format!(
        "Version: {}; Offset: {}; Help id: {};",
        menu.version, menu.header_offset, menu.help_id
    );
    stdout.write_line(&text).into_diagnostic()?;
    write_items(&stdout, &menu.items, 0)?;

    Ok(())
}

fn write_items(stdout: &console::Term, items: &[ParsedItem], depth: usize) -> Result<()> {
    for item in items {
        let mut flags = Vec::new();
        if item.is_separator() {
            flags.push("separator");
        }
        if item.is_disabled() {
            flags.push("disabled");
        }
        if item.is_checked() {
            flags.push("checked");
        }
        if item.is_last() {
            flags.push("last");
        }

        let text = format!(
            "{:indent$}[{}] {:?} @0x{:x} ({} bytes) {}",
            "",
            item.id,
            item.text,
            item.offset,
            item.size,
            flags.join(","),
            indent = depth * 2
        );
        stdout.write_line(text.trim_end()).into_diagnostic()?;

        if let Some(children) = &item.children {
            write_items(stdout, children, depth + 1)?;
        }
    }

    Ok(())
}

fn command_icon_stream(stdout: console::Term, file: String, rotation: u8) -> Result<()> {
    let bytes = std::fs::read(&file).into_diagnostic()?;
    let stream = icon_stream::decode_with(&bytes, &DecodeOptions { rotation }).wrap_err_with(
        || {
            format!(
                "\"{file}\" should hold the raw value of HKCU\\{ICON_STREAM_KEY}\\{ICON_STREAM_VALUE}"
            )
        },
    )?;

    stdout
        .write_str(&stream.to_string())
        .into_diagnostic()?;

    Ok(())
}

fn command_rot(stdout: console::Term, text: String, rotation: u8) -> Result<()> {
    stdout
        .write_line(&icon_stream::cipher::rotate(&text, rotation))
        .into_diagnostic()?;

    Ok(())
}

fn command_guid(stdout: console::Term, value: String) -> Result<()> {
    let guid = Guid::parse(&value)?;
    let bytes = guid.to_bytes();

    let text = format!("{guid}\nBytes: {}", hex_with(&bytes, " "));
    stdout.write_line(&text).into_diagnostic()?;

    Ok(())
}

fn is_exist_file(path: &str) -> bool {
    let metadata = Path::new(path);
    metadata.exists()
}

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use comfy_table::{modifiers, presets, ContentArrangement, Table};
use terminal_size::{terminal_size, Width};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use paramwire::codec::{Boundary, CodecError, LineEnding, MultiValueMap, MultipartCodec, Value};
use paramwire::config;
use paramwire::utils::{read_input, write_output};

#[derive(Parser)]
#[command(
    name = "paramwire",
    author,
    version,
    about = "Convert parameter maps to and from query strings and multipart bodies",
    long_about = r#"paramwire converts an ordered, multi-valued parameter map to and from the
two text formats used to send parameters over HTTP: URL query strings and
multipart/form-data bodies.

Maps are read and written as JSON objects whose members are arrays of
integers or strings, e.g. {"key1": [1, 2, 3], "key2": ["abc"], "key3": []}.

Examples:
  1) Encode a map as a query string:
      echo '{"key1":[1,2],"key2":"abc"}' | paramwire query encode
  2) Decode a query string:
      paramwire query decode 'key1=1&key1=2&key2=abc'
  3) Build and read back a multipart body:
      paramwire multipart encode params.json --boundary XyZ --output body.txt
      paramwire multipart decode body.txt --boundary XyZ
"#,
    after_help = "Use `paramwire <subcommand> --help` to get subcommand specific options and usage examples."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
    /// Print decoded maps as JSON instead of a table
    #[arg(long, global = true)]
    json: bool,
    /// Path to .env file
    #[arg(long, global = true)]
    env_file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Query string conversions
    Query {
        #[command(subcommand)]
        sub: QueryCommands,
    },
    /// multipart/form-data conversions
    Multipart {
        #[command(subcommand)]
        sub: MultipartCommands,
    },
}

#[derive(Subcommand)]
enum QueryCommands {
    #[command(about = "Encode a JSON map as a query string", long_about = "Read a JSON map from a file (or stdin) and print the query string. With `--url`, print the URL with the query appended.")]
    Encode {
        /// JSON map file, `-` or omitted for stdin
        input: Option<PathBuf>,
        /// Append the query to this URL
        #[arg(long)]
        url: Option<String>,
        /// Percent-encode keys and values (overrides PARAMWIRE_PERCENT_ENCODE)
        #[arg(long)]
        percent_encode: bool,
    },
    #[command(about = "Decode a query string", long_about = "Decode a query string, or the query part of a full URL when `--url` is given, and print the resulting map.")]
    Decode {
        query: String,
        /// Treat the argument as a URL and decode its query part
        #[arg(long)]
        url: bool,
        /// Percent-decode keys and values (overrides PARAMWIRE_PERCENT_ENCODE)
        #[arg(long)]
        percent_encode: bool,
    },
}

#[derive(Subcommand)]
enum MultipartCommands {
    #[command(about = "Encode a JSON map as a multipart body", long_about = "Read a JSON map and write a multipart/form-data body. The matching Content-Type header is printed on stderr. Without `--boundary` the PARAMWIRE_BOUNDARY variable is used, or a random boundary is generated.")]
    Encode {
        /// JSON map file, `-` or omitted for stdin
        input: Option<PathBuf>,
        /// Output file, `-` or omitted for stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Boundary token (without the leading `--`)
        #[arg(long)]
        boundary: Option<String>,
        /// Line ending to write: crlf or lf (overrides PARAMWIRE_LINE_ENDING)
        #[arg(long)]
        line_ending: Option<String>,
    },
    #[command(about = "Decode a multipart body", long_about = "Read a multipart/form-data body and print the resulting map. The delimiter comes from `--delimiter` (literal line prefix), `--boundary` (header token), `--content-type` (full header value) or PARAMWIRE_BOUNDARY, in that order.")]
    Decode {
        /// Body file, `-` or omitted for stdin
        input: Option<PathBuf>,
        #[command(flatten)]
        source: DelimiterSource,
    },
}

#[derive(Args)]
struct DelimiterSource {
    /// Literal line prefix that introduces each part, e.g. `--boundary`
    #[arg(long)]
    delimiter: Option<String>,
    /// Boundary token as written in the Content-Type header
    #[arg(long)]
    boundary: Option<String>,
    /// Full Content-Type header value
    #[arg(long)]
    content_type: Option<String>,
}

impl DelimiterSource {
    fn resolve(&self) -> Result<String, CodecError> {
        if let Some(d) = &self.delimiter {
            return Ok(d.clone());
        }
        if let Some(b) = &self.boundary {
            return Ok(Boundary::new(b.as_str())?.delimiter());
        }
        if let Some(ct) = &self.content_type {
            return Ok(Boundary::from_content_type(ct)?.delimiter());
        }
        config::get_boundary()
            .map(|b| b.delimiter())
            .ok_or_else(|| {
                CodecError::InvalidBoundary(format!(
                    "no delimiter given; use --delimiter, --boundary, --content-type or set {}",
                    config::BOUNDARY_VAR
                ))
            })
    }
}

fn value_type(v: &Value) -> &'static str {
    match v {
        Value::Integer(_) => "integer",
        Value::String(_) => "string",
    }
}

fn print_table(map: &MultiValueMap) {
    if map.is_empty() {
        println!("(empty map)");
        return;
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    if let Some((Width(w), _)) = terminal_size() {
        table.set_width(w.saturating_sub(4));
    }

    table.set_header(vec!["Key", "Type", "Value"]);
    for (key, values) in map.iter() {
        if values.is_empty() {
            table.add_row(vec![key.to_string(), "-".to_string(), "(no value)".to_string()]);
            continue;
        }
        for v in values {
            table.add_row(vec![key.to_string(), value_type(v).to_string(), v.to_string()]);
        }
    }

    println!("\n{table}\n");
}

fn print_map(map: &MultiValueMap, json: bool) -> Result<(), CodecError> {
    if json {
        println!("{}", map.to_json_pretty()?);
    } else {
        print_table(map);
    }
    Ok(())
}

fn read_map(input: Option<&std::path::Path>) -> Result<MultiValueMap, CodecError> {
    let bytes = read_input(input)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn run_query(sub: QueryCommands, json: bool) -> Result<(), CodecError> {
    match sub {
        QueryCommands::Encode { input, url, percent_encode } => {
            let map = read_map(input.as_deref())?;
            let mut codec = config::query_string_codec();
            if percent_encode {
                codec = codec.percent_encoded(true);
            }
            match url {
                Some(u) => println!("{}", codec.append_to_url(&u, &map)),
                None => println!("{}", codec.encode(&map)),
            }
        }
        QueryCommands::Decode { query, url, percent_encode } => {
            let mut codec = config::query_string_codec();
            if percent_encode {
                codec = codec.percent_encoded(true);
            }
            let map = if url {
                codec.decode_url(&query)
            } else {
                codec.decode(query.as_str())
            };
            print_map(&map, json)?;
        }
    }
    Ok(())
}

fn run_multipart(sub: MultipartCommands, json: bool) -> Result<(), CodecError> {
    match sub {
        MultipartCommands::Encode { input, output, boundary, line_ending } => {
            let map = read_map(input.as_deref())?;
            let boundary = match boundary {
                Some(b) => Boundary::new(b)?,
                None => config::get_boundary().unwrap_or_else(Boundary::generate),
            };
            let mut codec = config::multipart_codec(&boundary);
            if let Some(le) = line_ending {
                codec = codec.line_ending(le.parse::<LineEnding>()?);
            }
            let body = codec.encode(&map);
            eprintln!("Content-Type: {}", boundary.content_type());
            write_output(output.as_deref(), &body)?;
        }
        MultipartCommands::Decode { input, source } => {
            let delimiter = source.resolve()?;
            let body = read_input(input.as_deref())?;
            let map = MultipartCodec::new(delimiter).decode(&body);
            print_map(&map, json)?;
        }
    }
    Ok(())
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    // CLI parsing
    let cli = Cli::parse();

    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }

    config::load_env_file(cli.env_file.as_deref());

    let result = match cli.command {
        Commands::Query { sub } => run_query(sub, cli.json),
        Commands::Multipart { sub } => run_multipart(sub, cli.json),
    };

    if let Err(e) = result {
        tracing::error!(%e, "Command failed");
        eprintln!("{}: {}", yansi::Paint::new("Error").red(), e);
        process::exit(1);
    }
}

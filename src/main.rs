use clap::Parser as _;
use std::path::PathBuf;
use std::process;
use unxml::{NamespaceContext, Parser, Parsing, UnXmlConfig, UnXmlError};

#[derive(clap::Parser, Debug)]
#[command(version, about = "Print the node tree of an XML document as JSON")]
struct Args {
    /// XML file to read, or `-` for stdin
    input: String,

    /// XPath selecting the nodes to print
    #[arg(long, default_value = "/*")]
    root: String,

    /// Namespace binding as prefix=uri, may be repeated
    #[arg(long = "ns", value_parser = parse_binding)]
    namespaces: Vec<(String, String)>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_binding(binding: &str) -> Result<(String, String), String> {
    binding
        .split_once('=')
        .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
        .ok_or_else(|| format!("Expected prefix=uri, got '{}'", binding))
}

fn run(args: Args) -> Result<(), UnXmlError> {
    let mut config = match &args.config {
        Some(path) => UnXmlConfig::from_file(path)?,
        None => UnXmlConfig::new(),
    };
    for (prefix, uri) in args.namespaces {
        config = config.with_namespace(prefix, uri);
    }
    let parsing = Parsing::from_config(&config)?;
    log::debug!("Namespaces in scope: {}", describe(parsing.namespaces()));

    let loader = parsing.xml();
    let text = if args.input == "-" {
        loader.read(std::io::stdin().lock())?
    } else {
        loader.read_file(&args.input)?
    };
    let doc = loader.parse(&text)?;

    let parser = parsing.arr(&args.root, parsing.simple().node_tree_parser()).build();
    let json = parser.apply(doc.root_node())?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn describe(namespaces: &NamespaceContext) -> String {
    namespaces
        .iter()
        .map(|(prefix, uri)| format!("{}={}", prefix, uri))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prints the node tree of the selected nodes as JSON.
fn main() {
    env_logger::init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

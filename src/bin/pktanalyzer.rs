use argh::FromArgs;
use std::io::ErrorKind;

/// Print the Ethernet, IPv4 and TCP/UDP/ICMP headers of a captured frame.
#[derive(FromArgs, Debug)]
struct Args {
    /// path of the frame to analyze, relative to the current directory
    #[argh(positional)]
    paths: Vec<String>,
}

fn main() {
    let mut argv = std::env::args();
    let cmd = argv.next().unwrap_or_else(|| String::from("pktanalyzer"));
    let rest: Vec<String> = argv.collect();

    let paths = match parse_paths(&cmd, &rest) {
        Ok(paths) => paths,
        Err(output) => return print_usage(output.trim_end()),
    };

    match paths.as_slice() {
        [] => print_usage("No packet was supplied."),
        [path] => analyze(path),
        _ => print_usage("More than one argument was given."),
    }
}

// Every argument is a path, even one starting with `-`, so the arguments are
// handed to argh after a `--` separator.
fn parse_paths(cmd: &str, rest: &[String]) -> Result<Vec<String>, String> {
    let args: Vec<&str> = std::iter::once("--")
        .chain(rest.iter().map(String::as_str))
        .collect();
    Args::from_args(&[cmd], &args)
        .map(|Args { paths }| paths)
        .map_err(|exit| exit.output)
}

fn analyze(path: &str) {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return print_usage(&format!("No such file \"{path}\" was found."));
        }
        Err(e) => return print_usage(&format!("Could not read \"{path}\": {e}")),
    };

    match pktanalyzer::analyze(&bytes) {
        Ok(report) => println!("{report}"),
        Err(e) => println!("Error: {e}"),
    }
}

fn print_usage(msg: &str) {
    println!("Error: {msg}\n");
    println!("Usage: pktanalyzer <datafile>");
    println!("       <datafile> : The path to the packet to analyze");
}

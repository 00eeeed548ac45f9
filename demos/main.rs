// Copyright 2023 Christian Jaeger <ch@christianjaeger.ch>. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use nestext::debug::dump_all;
use nestext::parse::{parse, TokenWithPos};
use nestext::read::{load, load_file, read_named, write_all};
use nestext::settings::{Settings, STRUCTURE_ONLY, WITH_COMMENTS, DEFAULT_SETTINGS};
use nestext::value::Value;
use clap::Parser as ClapParser;
use std::io::{stdin, stdout, BufWriter};
use std::path::PathBuf;
use anyhow::{Result, bail};


fn indentstr(i: usize) -> Option<&'static str> {
    "                                                                  ".get(0..i)
}

#[derive(clap::Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Build up a tree of all content (default: stream tokens)
    #[clap(short, long, value_parser)]
    ast: bool,
    /// Print the parsed data
    #[clap(long, value_parser)]
    print: bool,
    /// Print one line per item with depth and line type, like the C
    /// example program
    #[clap(long, value_parser)]
    dump: bool,
    /// Show the token position (only with --print and no --ast)
    #[clap(long, value_parser)]
    pos: bool,
    /// Show the comments (only without --ast)
    #[clap(short, long, value_parser)]
    comments: bool,
    /// Log scanner activity to stderr
    #[clap(long, value_parser)]
    trace: bool,
    /// Path to the input file, `-` for stdin
    #[clap(value_parser, required(true))]
    input_path: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(std::io::stderr)
            .init();
    }

    // The scanner works on one buffer holding the whole document.
    let input: Vec<u8> =
        if args.input_path.as_os_str() == "-" {
            load(stdin().lock(), "stdin")?
        } else {
            load_file(&args.input_path)?
        };
    let settings = Settings {
        modes: if args.comments { &WITH_COMMENTS } else { &STRUCTURE_ONLY },
        ..DEFAULT_SETTINGS
    };

    if args.ast {

        // Build the whole tree, then optionally print it.

        let v: Option<Value> =
            read_named(&input, &args.input_path.to_string_lossy())?;
        if args.print {
            if let Some(v) = &v {
                write_all(BufWriter::new(stdout()), v)?;
            }
        }

    } else if args.dump {

        dump_all(&input, &settings, BufWriter::new(stdout().lock()))?;

    } else {

        // Go through the token stream and just do some bookkeeping
        // and optionally print the tokens.

        let mut count_items = 0;
        let mut max_depth = 0;
        for te in parse(&input, &settings) {
            let TokenWithPos { token, depth, pos } = te?;
            count_items += 1;
            max_depth = max_depth.max(depth);
            if args.print {
                if let Some(indent) = indentstr(depth * 2) {
                    if args.pos {
                        println!("{indent}{pos} {token}");
                    } else {
                        println!("{indent}{token}");
                    }
                } else {
                    bail!("items nested too deeply at {:?}{}", args.input_path, pos)
                }
            }
        }
        println!("# count_items = {count_items}, max_depth = {max_depth}");

    }
    Ok(())
}

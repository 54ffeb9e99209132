//! Demonstrates reading the CLR (.NET) header and metadata root out of a PE image.

use std::env;
use std::process;

use pe_image::pe::{Image, ParseOptions};

fn main() {
    let path = match env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: dotnet_pe_analysis <path-to-pe>");
            process::exit(1);
        }
    };

    let mut image = Image::new_from_path(&path, ParseOptions::default()).expect("failed to read file");
    image.parse().expect("failed to parse PE image");

    let Some(clr) = image.directories.clr.as_ref() else {
        eprintln!("{path} has no CLR (.NET) header");
        process::exit(1);
    };

    println!("{:#?}", clr.cor20_header);
    println!("{:#?}", clr.metadata_header);

    if let Ok(Some(mvid)) = clr.mvid() {
        println!("MVID bytes: {:02x?}", mvid);
    }

    for section in clr.sections() {
        match section {
            Ok(section) => println!("{:#?}", section),
            Err(err) => eprintln!("error reading CLR section: {err}"),
        }
    }

    if let Some(tables) = image.directories.clr_tables.as_ref() {
        println!(
            "metadata tables stream present, {} tables with rows",
            tables.row_counts.iter().filter(|&&count| count > 0).count()
        );
    }
}

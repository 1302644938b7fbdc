//! Basic usage demo for pacozip

use pacozip::{Archive, CompressionStrategy};
use std::fs::OpenOptions;
use std::io::Cursor;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== pacozip basic demo ===\n");

    println!("Creating test.paz...");
    let container = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open("test.paz")?;
    let mut archive = Archive::create(container)?;

    let mut hello = Cursor::new(b"Hello, pacozip!".to_vec());
    archive.add_file("hello.txt", &mut hello, CompressionStrategy::Lzw { param: 5 })?;

    let mut nested = Cursor::new(b"This is a nested file.".to_vec());
    archive.add_folder("folder")?;
    archive.add_file("folder/nested.txt", &mut nested, CompressionStrategy::Lzw { param: 5 })?;

    let mut data = Cursor::new(b"Line 1\nLine 2\nLine 3\n".to_vec());
    archive.add_file("data.txt", &mut data, CompressionStrategy::None)?;

    println!("created test.paz\n");

    println!("Entries in archive:");
    for entry in archive.iterate()? {
        println!("  - {} ({} bytes, codec_id={})", entry.name, entry.payload_size, entry.codec_id);
    }
    println!();

    println!("Reading hello.txt:");
    let mut out = Vec::new();
    archive.read_file("hello.txt", &mut out)?;
    println!("  Content: {}", String::from_utf8_lossy(&out));
    println!();

    println!("Reading data.txt:");
    let mut out = Vec::new();
    archive.read_file("data.txt", &mut out)?;
    println!("  Content:\n{}", String::from_utf8_lossy(&out));

    println!("verify(): {}", archive.verify()?);
    println!("all done!");

    Ok(())
}

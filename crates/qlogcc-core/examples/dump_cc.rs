use qlogcc_core::congestion::CcColumn;
use qlogcc_core::qlog::{LoadOptions, QlogFile, TraceMode};
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("Usage: dump_cc <qlog_file> [--multipath]");
        return;
    }

    let path = &args[1];
    let mode = if args.iter().any(|a| a == "--multipath") {
        TraceMode::Multipath
    } else {
        TraceMode::Single
    };
    println!("Parsing: {}", path);

    match QlogFile::from_file(path, &LoadOptions::with_mode(mode)) {
        Ok(file) => {
            println!("Title: {}", file.title.as_deref().unwrap_or("-"));
            println!("Traces: {}", file.traces.len());

            for (i, trace) in file.traces.iter().enumerate() {
                println!("\nTrace {}: reference_time={}", i, trace.reference_time());
                if let Some(abort) = trace.abort() {
                    println!("  stopped at event {}: {}", abort.index, abort.error);
                }
                for (entity, log) in trace.congestion_logs() {
                    println!("  {} ({} snapshots)", entity, log.len());
                    println!("    {}", CcColumn::headers().join(", "));
                    for row in log.rows().iter().take(10) {
                        println!("    {:?}", row);
                    }
                }
            }
        }
        Err(e) => {
            eprintln!("Failed to parse qlog: {:?}", e);
            std::process::exit(1);
        }
    }
}

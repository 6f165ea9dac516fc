//! ringdev - demo dan benchmark device ring buffer
//!
//! Skenario:
//! - Pipe: satu producer blocking, satu consumer blocking di device 0
//! - Multiplexed: satu consumer non-blocking memantau device 1..N lewat mio
//!
//! Usage:
//!   cargo run --release -- [OPTIONS]

use std::error::Error as StdError;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use ringdev::device::Token;
use ringdev::{AccessMode, DeviceConfig, DeviceTable, Error, Multiplexer, ReadinessFlags};
use tracing_subscriber::EnvFilter;

type DemoResult<T> = Result<T, Box<dyn StdError + Send + Sync>>;

/// Konfigurasi demo
struct DemoConfig {
    devices: usize,
    capacity: Option<usize>,
    total_bytes: usize,
    chunk: usize,
    verbose: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            devices: 4,
            capacity: None,
            total_bytes: 16 * 1024 * 1024,
            chunk: 512,
            verbose: false,
        }
    }
}

/// Byte ke-`offset` dari stream uji
#[inline(always)]
fn pattern(offset: usize) -> u8 {
    (offset % 251) as u8
}

fn main() {
    let config = parse_args();
    init_tracing(config.verbose);

    if let Err(e) = run(config) {
        eprintln!("❌ ringdev error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(config: DemoConfig) -> DemoResult<()> {
    println!("🔁 ringdev - Bounded Ring Device Demo");
    println!("=====================================\n");

    let device_config = DeviceConfig {
        device_count: config.devices,
        ..DeviceConfig::default()
    };
    let table = DeviceTable::new(&device_config)?;

    if let Some(capacity) = config.capacity {
        for minor in 0..table.len() {
            table.size_attribute(minor)?.store(&capacity.to_string())?;
        }
    }

    println!(
        "  Devices: {}  Capacity: {} bytes (bounds {}..={})\n",
        table.len(),
        table.get(0)?.capacity(),
        device_config.bounds.min,
        device_config.bounds.max
    );

    benchmark_pipe(&table, config.total_bytes, config.chunk)?;

    if table.len() > 1 {
        benchmark_multiplexed(&table, config.total_bytes, config.chunk)?;
    }

    print_stats(&table);
    println!("\n✅ All scenarios complete!");
    Ok(())
}

fn benchmark_pipe(table: &DeviceTable, total: usize, chunk: usize) -> DemoResult<()> {
    println!("📊 Blocking Pipe (device 0)");
    println!("---------------------------");

    let mut writer = table.open(0, AccessMode::Write, false)?;
    let mut reader = table.open(0, AccessMode::Read, false)?;

    let start = Instant::now();
    let received = thread::scope(|scope| -> DemoResult<usize> {
        let producer = scope.spawn(move || -> ringdev::Result<()> {
            let mut buf = vec![0u8; chunk];
            let mut sent = 0;
            while sent < total {
                let len = chunk.min(total - sent);
                for (i, b) in buf[..len].iter_mut().enumerate() {
                    *b = pattern(sent + i);
                }
                // Partial write itu normal, ulangi sisanya
                let mut done = 0;
                while done < len {
                    done += writer.write(&buf[done..len])?;
                }
                sent += len;
            }
            Ok(())
        });

        let mut buf = vec![0u8; chunk];
        let mut received = 0;
        while received < total {
            let n = reader.read(&mut buf)?;
            verify(&buf[..n], received)?;
            received += n;
        }

        producer.join().map_err(|_| "producer thread panicked")??;
        Ok(received)
    })?;

    report("pipe", received, start.elapsed());
    Ok(())
}

fn benchmark_multiplexed(table: &DeviceTable, total: usize, chunk: usize) -> DemoResult<()> {
    println!("📊 Multiplexed Readers (devices 1..{})", table.len() - 1);
    println!("-------------------------------------");

    let minors: Vec<usize> = (1..table.len()).collect();
    let per_device = total / minors.len();

    let mut mux = Multiplexer::new()?;
    let mut readers = Vec::with_capacity(minors.len());
    for &minor in &minors {
        mux.add(Token(minor), table.get(minor)?, ReadinessFlags::READABLE)?;
        readers.push(table.open(minor, AccessMode::Read, true)?);
    }

    let start = Instant::now();
    let producers: Vec<_> = minors
        .iter()
        .map(|&minor| -> DemoResult<thread::JoinHandle<ringdev::Result<()>>> {
            let device = Arc::clone(table.get(minor)?);
            let mut writer = device.open(AccessMode::Write, false);
            Ok(thread::spawn(move || -> ringdev::Result<()> {
                let buf: Vec<u8> = (0..chunk).map(pattern).collect();
                let mut sent = 0;
                while sent < per_device {
                    let len = chunk.min(per_device - sent);
                    sent += writer.write(&buf[..len])?;
                }
                Ok(())
            }))
        })
        .collect::<DemoResult<Vec<_>>>()?;

    let mut received = vec![0usize; minors.len()];
    let mut buf = vec![0u8; chunk];
    let mut wakeups = 0u64;

    while received.iter().any(|&r| r < per_device) {
        let ready = mux.wait(Some(Duration::from_secs(5)))?;
        if ready.is_empty() {
            return Err("multiplexer timed out with data outstanding".into());
        }
        wakeups += 1;

        for event in ready {
            let idx = event.token.0 - 1;
            loop {
                match readers[idx].read(&mut buf) {
                    Ok(n) => received[idx] += n,
                    Err(Error::WouldBlock) => break,
                    Err(e) => return Err(e.into()),
                }
            }
        }
    }

    for producer in producers {
        producer.join().map_err(|_| "producer thread panicked")??;
    }

    let total_received: usize = received.iter().sum();
    report("multiplexed", total_received, start.elapsed());
    println!("  Multiplexer wakeups: {}\n", wakeups);
    Ok(())
}

fn verify(data: &[u8], offset: usize) -> DemoResult<()> {
    for (i, &b) in data.iter().enumerate() {
        if b != pattern(offset + i) {
            return Err(format!("stream corrupted at byte {}", offset + i).into());
        }
    }
    Ok(())
}

fn report(name: &str, bytes: usize, elapsed: Duration) {
    println!("  Scenario:   {}", name);
    println!("  Bytes:      {}", bytes);
    println!("  Duration:   {:.2} ms", elapsed.as_secs_f64() * 1000.0);
    println!(
        "  Throughput: {:.2} MB/sec\n",
        bytes as f64 / elapsed.as_secs_f64() / 1_000_000.0
    );
}

fn print_stats(table: &DeviceTable) {
    println!("📈 Device Stats");
    println!("---------------");
    for (minor, device) in table.iter() {
        let stats = device.stats();
        println!(
            "  [{}] in: {} B / {} calls, out: {} B / {} calls, would-block: {}, resizes: {}",
            minor,
            stats.bytes_written,
            stats.writes,
            stats.bytes_read,
            stats.reads,
            stats.would_block,
            stats.resizes
        );
    }
}

fn parse_args() -> DemoConfig {
    let args: Vec<String> = std::env::args().collect();
    let mut config = DemoConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--devices" | "-d" => {
                if i + 1 < args.len() {
                    config.devices = args[i + 1].parse().unwrap_or(config.devices);
                    i += 1;
                }
            }
            "--capacity" | "-c" => {
                if i + 1 < args.len() {
                    config.capacity = args[i + 1].parse().ok();
                    i += 1;
                }
            }
            "--bytes" | "-n" => {
                if i + 1 < args.len() {
                    config.total_bytes = args[i + 1].parse().unwrap_or(config.total_bytes);
                    i += 1;
                }
            }
            "--chunk" => {
                if i + 1 < args.len() {
                    config.chunk = args[i + 1].parse().unwrap_or(config.chunk).max(1);
                    i += 1;
                }
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--help" | "-h" => {
                println!("ringdev - Bounded Ring Device Demo\n");
                println!("Usage: ringdev [OPTIONS]\n");
                println!("Options:");
                println!("  -d, --devices <N>     Number of devices (default: 4)");
                println!("  -c, --capacity <B>    Capacity stored via the size attribute");
                println!("  -n, --bytes <B>       Bytes per scenario (default: 16 MiB)");
                println!("      --chunk <B>       Transfer chunk size (default: 512)");
                println!("  -v, --verbose         Debug logging (RUST_LOG overrides)");
                println!("  -h, --help            Show this help");
                std::process::exit(0);
            }
            _ => {}
        }
        i += 1;
    }

    config
}

use std::time::{Duration, Instant};

use clap::Parser;
use hekit::{
    random, DenseMatrix, Evaluate, HeKit, KitBase, KitParameters, Plaintext, SchemaType, Serializable,
};

const PROMPT_LENGTH: usize = 18;

#[derive(Parser)]
struct Arguments {

    #[arg(short='s', default_value="z-paillier")]
    schema: String,

    #[arg(short='k', default_value_t = 0)]
    key_size: usize,

    #[arg(short='n', default_value_t = 64)]
    length: usize,

    #[arg(short='m', default_value_t = 16)]
    output_dims: usize,

    #[arg(short='r', default_value_t = 1)]
    rounds: usize,

}

fn print_time(prompt: &str, total_time: Duration, div: usize) {
    let time = total_time / (div as u32);
    let value = if time <= Duration::from_micros(1) {
        format!("{:>9} ns", time.as_nanos())
    } else if time <= Duration::from_millis(1) {
        format!("{:>9.3} us", time.as_nanos() as f64 / 1000.0)
    } else if time <= Duration::from_secs(1) {
        format!("{:>9.3} ms", time.as_micros() as f64 / 1000.0)
    } else {
        format!("{:>9.3} s ", time.as_millis() as f64 / 1000.0)
    };
    println!("  {:<width$}: {}", prompt, value, width = PROMPT_LENGTH);
}

fn print_size(prompt: &str, bytes: usize) {
    let value = if bytes < 1024 {
        format!("{:>9} B ", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:>9.3} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:>9.3} MB", bytes as f64 / 1024.0 / 1024.0)
    };
    println!("  {:<width$}: {}", prompt, value, width = PROMPT_LENGTH);
}

fn timed<T, F: FnMut() -> T>(rounds: usize, mut f: F) -> (T, Duration) {
    let start = Instant::now();
    let mut result = f();
    for _ in 1..rounds {
        result = f();
    }
    (result, start.elapsed())
}

fn main() {

    let args = Arguments::parse();
    let schema: SchemaType = match args.schema.parse() {
        Ok(schema) => schema,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let mut params = KitParameters::new(schema);
    if args.key_size > 0 {
        params = params.set_key_size(args.key_size);
    }
    let rounds = args.rounds.max(1);

    println!("[Arguments]");
    println!("  schema            = {}", schema);
    println!("  key size          = {}", params.key_size());
    println!("  vector length     = {}", args.length);
    println!("  output dims       = {}", args.output_dims);
    println!("  rounds            = {}", rounds);

    println!("[Running]");
    let (kit, elapsed) = timed(1, || HeKit::new(params));
    let kit = match kit {
        Ok(kit) => kit,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    print_time("keygen", elapsed, 1);

    let run = || -> hekit::Result<()> {
        let low = kit.plaintext(-1000)?;
        let high = kit.plaintext(1000)?;
        let x = random::randint(&low, &high, &[args.length])?;
        let w = random::randint(&low, &high, &[args.length, args.output_dims])?;

        let (cx, elapsed) = timed(rounds, || kit.encryptor().encrypt_array(&x));
        let cx = cx?;
        print_time("encrypt", elapsed, rounds * args.length);

        let (sum, elapsed) = timed(rounds, || kit.evaluator().add(&cx, &cx));
        sum?;
        print_time("add", elapsed, rounds * args.length);

        let (product, elapsed) = timed(rounds, || kit.evaluator().mul(&cx, &x));
        product?;
        print_time("mul plain", elapsed, rounds * args.length);

        let (y, elapsed) = timed(rounds, || kit.evaluator().matmul(&cx, &w));
        let y = y?;
        print_time("matmul", elapsed, rounds);

        let (total, elapsed) = timed(rounds, || kit.evaluator().sum(&cx));
        total?;
        print_time("sum", elapsed, rounds);

        let (decrypted, elapsed) = timed(rounds, || kit.decryptor().decrypt_array(&y));
        let decrypted = decrypted?;
        print_time("decrypt", elapsed, rounds * args.output_dims);

        let expected: DenseMatrix<Plaintext> = kit.evaluator().matmul(&x, &w)?;
        println!("  {:<width$}: {}", "correct", decrypted == expected, width = PROMPT_LENGTH);

        println!("[Communication]");
        print_size("public key", kit.public_key().serialized_size());
        print_size("input", cx.serialized_size());
        print_size("output", y.serialized_size());
        Ok(())
    };
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

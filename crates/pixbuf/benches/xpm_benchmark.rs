use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pixbuf::decode_xpm;
use std::hint::black_box;

const CODE_CHARS: &[u8] = b".#abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Builds an XPM with `colors` entries and `cpp` characters per pixel.
fn generate_xpm(width: usize, height: usize, colors: usize, cpp: usize) -> Vec<u8> {
    let code = |i: usize| -> String {
        let mut n = i;
        (0..cpp)
            .map(|_| {
                let c = CODE_CHARS[n % CODE_CHARS.len()] as char;
                n /= CODE_CHARS.len();
                c
            })
            .collect()
    };

    let mut out = String::from("/* XPM */\nstatic char *bench[] = {\n");
    out.push_str(&format!("\"{width} {height} {colors} {cpp}\",\n"));
    for i in 0..colors {
        let v = (i * 255 / colors.max(1)) as u8;
        out.push_str(&format!("\"{} c #{v:02x}{:02x}{:02x}\",\n", code(i), 255 - v, v / 2));
    }
    for y in 0..height {
        out.push('"');
        for x in 0..width {
            out.push_str(&code((x + y) % colors));
        }
        out.push_str("\",\n");
    }
    out.push_str("};\n");
    out.into_bytes()
}

fn bench_decode_cpp(c: &mut Criterion) {
    let mut group = c.benchmark_group("xpm_cpp");

    for &(colors, cpp) in &[(16, 1), (256, 2), (1000, 3)] {
        let data = generate_xpm(128, 128, colors, cpp);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{colors}_colors_cpp{cpp}")),
            &data,
            |b, data| {
                b.iter(|| {
                    let result = decode_xpm(black_box(data));
                    assert!(result.is_ok());
                    result
                })
            },
        );
    }
    group.finish();
}

fn bench_decode_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("xpm_sizes");

    for &size in &[16usize, 64, 256] {
        let data = generate_xpm(size, size, 8, 1);
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| decode_xpm(black_box(data)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_decode_cpp, bench_decode_sizes);
criterion_main!(benches);

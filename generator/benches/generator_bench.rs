use blgen::generate::generate;
use blgen::parser;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// Representative definition-file scenarios.

const SCALAR_LIBRARY: &str = "\
native float cos float : x:float
    return std::cos(x);
end

native float sin float : x:float
    return std::sin(x);
end
";

const GENERIC_LIBRARY: &str = "\
def vecf : float2 float3 float4 float8 float16
def gentype : float $vecf

native $type cos $vecf : x:$type
    int i;

    for (i = 0; i < $vecdim; i++)
        result[i] = std::cos(x[i]);
end

func $type degrees $gentype : radians:$type
    return ($type)57.295779513082321 * radians;
end

func $type max $gentype : a:$type b:$type
    return (a > b) ? a : b;
end
";

fn scenarios() -> [(&'static str, &'static str); 2] {
    [("scalar", SCALAR_LIBRARY), ("generic", GENERIC_LIBRARY)]
}

/// Scaling generator: `n` generic functions over six instantiation types.
fn generate_scaling_library(n: usize) -> String {
    let mut source = String::from("def gentype : float float2 float4 float8 float16 double\n\n");
    for i in 0..n {
        source.push_str(&format!(
            "native $type op{} $gentype : a:$type b:$type\n",
            i
        ));
        source.push_str("    int i;\n");
        source.push_str("    for (i = 0; i < $vecdim; i++)\n");
        source.push_str("        result[i] = a[i] + b[i];\n");
        source.push_str("end\n\n");
    }
    source
}

fn bench_parse_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_latency");

    for (name, source) in scenarios() {
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, source| {
            b.iter(|| {
                let program = parser::parse(black_box(source)).unwrap();
                black_box(&program.functions);
            });
        });
    }

    group.finish();
}

fn bench_generate_latency(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_latency");

    for (name, source) in scenarios() {
        group.bench_with_input(BenchmarkId::from_parameter(name), source, |b, source| {
            b.iter(|| {
                let files = generate(black_box(source)).unwrap();
                black_box(&files);
            });
        });
    }

    group.finish();
}

fn bench_generate_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_scaling");

    for n_functions in [1_usize, 10, 50, 100] {
        let source = generate_scaling_library(n_functions);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}funcs", n_functions)),
            &source,
            |b, source| {
                b.iter(|| {
                    let files = generate(black_box(source.as_str())).unwrap();
                    black_box(&files);
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_parse_latency,
    bench_generate_latency,
    bench_generate_scaling,
);
criterion_main!(benches);

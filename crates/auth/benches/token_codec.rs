use chrono::Utc;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use farmxchain_auth::{Role, SigningKey, TokenCodec};
use farmxchain_core::AccountId;

fn bench_token_codec(c: &mut Criterion) {
    let codec = TokenCodec::new(
        SigningKey::new(&b"bench-secret-bench-secret-bench-secret"[..]).expect("key"),
    );
    let token = codec
        .issue(AccountId::new(42), "farmer@example.com", &Role::FARMER)
        .expect("issue");

    c.bench_function("issue", |b| {
        b.iter(|| {
            codec
                .issue(black_box(AccountId::new(42)), black_box("farmer@example.com"), &Role::FARMER)
                .expect("issue")
        })
    });

    c.bench_function("verify", |b| {
        b.iter(|| codec.verify_at(black_box(&token), Utc::now()).expect("verify"))
    });

    c.bench_function("validate_forged", |b| {
        let forged = format!("{token}x");
        b.iter(|| codec.validate(black_box(&forged), "farmer@example.com"))
    });
}

criterion_group!(benches, bench_token_codec);
criterion_main!(benches);

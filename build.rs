use vergen::*;

fn main() {
    let flags = ConstantsFlags::all();
    // not fatal outside of a git checkout
    if let Err(e) = gen(flags) {
        println!("cargo:warning=unable to generate the cargo keys: {}", e);
    }

    let mut features = vec![];
    for (k, _v) in std::env::vars() {
        if k.as_str() == "CARGO_FEATURE_WITH_MPI" {
            features.push("with-mpi");
        }
    }
    let features = features.join(",");
    println!("cargo:rustc-env=RADRR_ACTIVE_FEATURES={}", features);
}

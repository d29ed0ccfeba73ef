#![allow(dead_code)]

use std::fmt::Write as _;
use std::path::Path;

pub const XS: [f64; 5] = [1e-5, 1e-3, 1e-1, 0.5, 1.0];
pub const QS_LOW: [f64; 3] = [1.65, 2.5, 4.92];
pub const QS_HIGH: [f64; 3] = [4.92, 20.0, 100.0];
pub const FLAVORS: [i32; 3] = [-1, 1, 21];

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Smooth toy xf(x, Q) per flavor and member.
pub fn xf(x: f64, q: f64, flavor: i32, member: usize) -> f64 {
    let norm = 1.0 + 0.01 * member as f64 + 0.1 * flavor.abs() as f64;
    norm * x.powf(0.3) * (1.0 - x).powi(3) * (1.0 + 0.05 * q.ln())
}

fn join(values: impl IntoIterator<Item = String>) -> String {
    values.into_iter().collect::<Vec<_>>().join(" ")
}

/// Member file text in LHA layout.
pub fn member_text(member: usize, xs: &[f64]) -> String {
    let mut text = String::new();
    let kind = if member == 0 { "central" } else { "replica" };
    writeln!(text, "PdfType: {kind}\nFormat: lhagrid1\n---").unwrap();
    for qs in [&QS_LOW[..], &QS_HIGH[..]] {
        writeln!(text, "{}", join(xs.iter().map(|x| format!("{x:e}")))).unwrap();
        writeln!(text, "{}", join(qs.iter().map(|q| format!("{q:e}")))).unwrap();
        writeln!(text, "{}", join(FLAVORS.iter().map(|f| f.to_string()))).unwrap();
        for &x in xs {
            for &q in qs {
                let row = FLAVORS.iter().map(|&f| format!("{:.10e}", xf(x, q, f, member)));
                writeln!(text, " {}", join(row)).unwrap();
            }
        }
        writeln!(text, "---").unwrap();
    }
    text
}

/// Write `<root>/<name>/` with an info file and `members` member files.
pub fn write_set(root: &Path, name: &str, lhaid: u32, members: usize) {
    let dir = root.join(name);
    std::fs::create_dir_all(&dir).unwrap();

    let info = format!(
        "SetDesc: toy set for tests\n\
         SetIndex: {lhaid}\n\
         NumMembers: {members}\n\
         ErrorType: replicas\n\
         Flavors: [-1, 1, 21]\n\
         Interpolator: logcubic\n\
         Extrapolator: continuation\n\
         AlphaS_Qs: [1.65, 4.92, 4.92, 100.0]\n\
         AlphaS_Vals: [0.33, 0.22, 0.22, 0.12]\n"
    );
    std::fs::write(dir.join(format!("{name}.info")), info).unwrap();

    for member in 0..members {
        std::fs::write(
            dir.join(format!("{name}_{member:04}.dat")),
            member_text(member, &XS),
        )
        .unwrap();
    }
}

pub fn append_index(root: &Path, lhaid: u32, name: &str) {
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(root.join("pdfsets.index"))
        .unwrap();
    writeln!(file, "{lhaid} {name} 1").unwrap();
}

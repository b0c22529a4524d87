use anyhow::{Context, Result};

const GENES: &[&str] = &[
    "TP53", "BRCA1", "EGFR", "MYC", "KRAS", "PTEN", "CDK4", "STAT3", "VEGFA", "ESR1",
];

const PATHWAYS: &[&str] = &[
    "Apoptosis",
    "Cell cycle",
    "DNA repair",
    "Glycolysis",
    "Hypoxia",
    "Inflammatory response",
    "Interferon alpha response",
    "KRAS signaling up",
    "MTORC1 signaling",
    "Myogenesis",
    "Notch signaling",
    "Oxidative phosphorylation",
    "P53 pathway",
    "PI3K/AKT/mTOR signaling",
    "Protein secretion",
    "TGF-beta signaling",
    "TNF-alpha signaling via NF-kB",
    "Unfolded protein response",
    "WNT/beta-catenin signaling",
    "Xenobiotic metabolism",
    "Angiogenesis",
    "Adipogenesis",
    "Allograft rejection",
    "Androgen response",
    "Bile acid metabolism",
    "Cholesterol homeostasis",
    "Coagulation",
    "E2F targets",
    "Epithelial mesenchymal transition",
    "G2M checkpoint",
];

/// Number of samples the synthetic correlations are "computed" over.
const SAMPLES: f64 = 120.0;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// Complementary error function, Abramowitz & Stegun 7.1.26.
fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.3275911 * z);
    let poly = t
        * (0.254829592
            + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    let r = poly * (-z * z).exp();
    if x >= 0.0 {
        r
    } else {
        2.0 - r
    }
}

/// Two-sided p-value for a Pearson correlation, normal approximation of the
/// t statistic.
fn correlation_p_value(r: f64, n: f64) -> f64 {
    let r = r.clamp(-0.999_999, 0.999_999);
    let t = r * ((n - 2.0) / (1.0 - r * r)).sqrt();
    erfc(t.abs() / std::f64::consts::SQRT_2).max(f64::MIN_POSITIVE)
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let path = "gene_pathway_cor.csv";

    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create {path}"))?;
    writer.write_record(["gene", "pathway", "cor", "pval"])?;

    let mut rows = 0usize;
    for (g, gene) in GENES.iter().enumerate() {
        // Each gene gets a handful of strongly associated pathways.
        let bias = rng.gauss(0.0, 0.15);
        for (p, pathway) in PATHWAYS.iter().enumerate() {
            let strong = (g * 7 + p * 3) % 11 == 0;
            let spread = if strong { 0.45 } else { 0.2 };
            let cor = (bias + rng.gauss(0.0, spread)).clamp(-0.99, 0.99);
            let pval = correlation_p_value(cor, SAMPLES);

            // A few missing p-values, as in real exports.
            let pval_cell = if rng.next_f64() < 0.03 {
                "NA".to_string()
            } else {
                format!("{pval:.3e}")
            };
            writer.write_record([
                gene.to_string(),
                pathway.to_string(),
                format!("{cor:.4}"),
                pval_cell,
            ])?;
            rows += 1;
        }
    }
    writer.flush()?;

    println!(
        "Wrote {} rows ({} genes × {} pathways) to {}",
        rows,
        GENES.len(),
        PATHWAYS.len(),
        path
    );
    Ok(())
}

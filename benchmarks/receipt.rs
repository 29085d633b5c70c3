use std::time::Duration;

/// Measurements for one index structure over the whole query workload.
pub struct Receipt {
    pub structure: String,
    pub dataset_len: usize,
    pub k: usize,
    pub build_time: Duration,
    latencies: Vec<Duration>,
    comparisons: Vec<usize>,
    similarity_total: f64,
}

impl Receipt {
    pub fn new(structure: &str, dataset_len: usize, k: usize, build_time: Duration) -> Self {
        Self {
            structure: structure.to_string(),
            dataset_len,
            k,
            build_time,
            latencies: Vec::new(),
            comparisons: Vec::new(),
            similarity_total: 0.0,
        }
    }

    pub fn record(&mut self, latency: Duration, comparisons: usize, avg_similarity: f64) {
        self.latencies.push(latency);
        self.comparisons.push(comparisons);
        self.similarity_total += avg_similarity;
    }

    pub fn queries(&self) -> usize {
        self.latencies.len()
    }

    pub fn mean_comparisons(&self) -> f64 {
        if self.comparisons.is_empty() {
            return 0.0;
        }
        self.comparisons.iter().sum::<usize>() as f64 / self.comparisons.len() as f64
    }

    pub fn mean_similarity(&self) -> f64 {
        if self.latencies.is_empty() {
            return 0.0;
        }
        self.similarity_total / self.latencies.len() as f64
    }

    /// Nearest-rank percentile, `p` in [0, 1].
    pub fn latency_percentile(&self, p: f64) -> Duration {
        let mut sorted = self.latencies.clone();
        sorted.sort();
        match sorted.len() {
            0 => Duration::ZERO,
            n => sorted[((n as f64 * p) as usize).min(n - 1)],
        }
    }

    pub fn average_latency(&self) -> Duration {
        match self.latencies.len() {
            0 => Duration::ZERO,
            n => self.latencies.iter().sum::<Duration>() / n as u32,
        }
    }

    pub fn print(&self) {
        println!("\n==================================================");
        println!("        SIMILARITY BENCHMARK RECEIPT: {}", self.structure.to_uppercase());
        println!("==================================================");
        println!(" [ BLOCK 1: CONFIGURATION ]");
        println!(" Vectors:      {}", self.dataset_len);
        println!(" Queries:      {}", self.queries());
        println!(" k:            {}", self.k);
        println!(" Build Time:   {:.2?}", self.build_time);
        println!("--------------------------------------------------");
        println!(" [ BLOCK 2: QUERY COST ]");
        println!(" Comparisons:  {:.1} avg per query", self.mean_comparisons());
        let scanned = if self.dataset_len > 0 {
            100.0 * self.mean_comparisons() / self.dataset_len as f64
        } else {
            0.0
        };
        println!(" Scanned:      {:.2}% of dataset", scanned);
        println!(" Similarity:   {:.6} avg top-k", self.mean_similarity());
        println!("--------------------------------------------------");
        println!(" [ BLOCK 3: STATISTICAL LATENCY ]");
        println!(" Average:      {:.2?}", self.average_latency());
        println!(" P50 (Median): {:.2?}", self.latency_percentile(0.50));
        println!(" P99 (Tail):   {:.2?}", self.latency_percentile(0.99));
        println!(" Max/Jitter:   {:.2?}", self.latency_percentile(1.0));
        println!("==================================================");
    }
}

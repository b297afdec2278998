/// Largest-Triangle-Three-Buckets (LTTB) downsampling.
/// Keeps the first and last point and, per bucket, the point forming the
/// largest triangle with the previously kept point and the next bucket's
/// average. Input must be sorted by x.
pub fn lttb_downsample(points: &[(f64, f64)], target: usize) -> Vec<(f64, f64)> {
    let n = points.len();
    if n <= target || target < 3 {
        return points.to_vec();
    }

    let mut out = Vec::with_capacity(target);
    out.push(points[0]);

    let bucket_size = (n - 2) as f64 / (target - 2) as f64;
    let mut prev = points[0];

    for i in 0..(target - 2) {
        let bucket_start = ((i as f64 * bucket_size) as usize + 1).min(n - 1);
        let bucket_end = (((i as f64 + 1.0) * bucket_size) as usize + 1).min(n - 1);

        let next_start = bucket_end;
        let next_end = (((i as f64 + 2.0) * bucket_size) as usize + 1).min(n);
        let next = &points[next_start..next_end.max(next_start + 1).min(n)];
        let (sum_x, sum_y) = next.iter().fold((0.0, 0.0), |(sx, sy), (x, y)| (sx + x, sy + y));
        let avg = (sum_x / next.len() as f64, sum_y / next.len() as f64);

        let mut max_area = -1.0f64;
        let mut best = points[bucket_start];
        for &candidate in &points[bucket_start..bucket_end.max(bucket_start + 1)] {
            // doubled area, only compared
            let area = ((prev.0 - avg.0) * (candidate.1 - prev.1)
                - (prev.0 - candidate.0) * (avg.1 - prev.1))
                .abs();
            if area > max_area {
                max_area = area;
                best = candidate;
            }
        }

        out.push(best);
        prev = best;
    }

    out.push(points[n - 1]);
    out
}

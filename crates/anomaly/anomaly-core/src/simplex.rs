//! Nelder-Mead downhill simplex minimizer.
//!
//! Derivative-free, deterministic for a given start point, which keeps the
//! GARCH fit reproducible across calls.

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;
const TINY: f64 = 1e-10;

/// Result of a simplex minimization.
#[derive(Debug, Clone)]
pub(crate) struct SimplexOutcome {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Minimize `objective` starting from `start`, with an initial simplex built
/// by offsetting each coordinate by the matching entry of `steps`.
///
/// Converges when the relative spread between the best and worst vertex
/// values drops below `tolerance`. Non-finite objective values are treated as
/// `+inf`, so infeasible regions are simply never accepted.
pub(crate) fn minimize<F>(
    objective: F,
    start: &[f64],
    steps: &[f64],
    max_iterations: usize,
    tolerance: f64,
) -> SimplexOutcome
where
    F: Fn(&[f64]) -> f64,
{
    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    let n = start.len();
    let mut vertices: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    vertices.push(start.to_vec());
    for i in 0..n {
        let mut v = start.to_vec();
        v[i] += steps[i];
        vertices.push(v);
    }
    let mut values: Vec<f64> = vertices.iter().map(|v| eval(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        order(&mut vertices, &mut values);

        let best = values[0];
        let worst = values[n];
        if 2.0 * (worst - best).abs() <= tolerance * (worst.abs() + best.abs() + TINY) {
            converged = true;
            break;
        }
        iterations += 1;

        let centroid = centroid(&vertices[..n]);
        let reflected = along(&centroid, &vertices[n], -REFLECTION);
        let f_reflected = eval(&reflected);

        if f_reflected < best {
            let expanded = along(&centroid, &vertices[n], -EXPANSION);
            let f_expanded = eval(&expanded);
            if f_expanded < f_reflected {
                vertices[n] = expanded;
                values[n] = f_expanded;
            } else {
                vertices[n] = reflected;
                values[n] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[n - 1] {
            vertices[n] = reflected;
            values[n] = f_reflected;
            continue;
        }

        // Contract towards the better of the reflected and worst vertices.
        let (contracted, f_contracted, accept) = if f_reflected < worst {
            let c = along(&centroid, &reflected, CONTRACTION);
            let fc = eval(&c);
            (c, fc, fc <= f_reflected)
        } else {
            let c = along(&centroid, &vertices[n], CONTRACTION);
            let fc = eval(&c);
            (c, fc, fc < worst)
        };

        if accept {
            vertices[n] = contracted;
            values[n] = f_contracted;
            continue;
        }

        let anchor = vertices[0].clone();
        for i in 1..=n {
            vertices[i] = along(&anchor, &vertices[i], SHRINK);
            values[i] = eval(&vertices[i]);
        }
    }

    order(&mut vertices, &mut values);
    SimplexOutcome {
        point: vertices.swap_remove(0),
        value: values[0],
        iterations,
        converged,
    }
}

/// Sort vertices ascending by objective value.
fn order(vertices: &mut Vec<Vec<f64>>, values: &mut Vec<f64>) {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    *vertices = idx.iter().map(|&i| vertices[i].clone()).collect();
    *values = idx.iter().map(|&i| values[i]).collect();
}

fn centroid(vertices: &[Vec<f64>]) -> Vec<f64> {
    let n = vertices.len() as f64;
    let dim = vertices[0].len();
    (0..dim)
        .map(|d| vertices.iter().map(|v| v[d]).sum::<f64>() / n)
        .collect()
}

/// `origin + t * (target - origin)`.
fn along(origin: &[f64], target: &[f64], t: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(target)
        .map(|(o, x)| o + t * (x - o))
        .collect()
}

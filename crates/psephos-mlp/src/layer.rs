//! Fully connected layer and weight initialization.

use rand::Rng;

/// Weight initialization scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Init {
    /// He et al. (2015): `U(-sqrt(6 / fan_in), sqrt(6 / fan_in))`, for ReLU layers.
    KaimingUniform,
    /// Glorot & Bengio (2010): `U(-sqrt(6 / (fan_in + fan_out)), ...)`, for the
    /// softmax output layer.
    XavierUniform,
}

/// Dense layer `z = W x + b` with weights stored row-major as
/// `weights[out * n_in + in]`.
#[derive(Debug, Clone)]
pub(crate) struct Dense {
    pub(crate) weights: Vec<f64>,
    pub(crate) bias: Vec<f64>,
    pub(crate) n_in: usize,
    pub(crate) n_out: usize,
}

impl Dense {
    /// New layer with initialized weights and zero bias.
    pub(crate) fn new(n_in: usize, n_out: usize, init: Init, rng: &mut impl Rng) -> Self {
        let bound = match init {
            Init::KaimingUniform => (6.0 / n_in as f64).sqrt(),
            Init::XavierUniform => (6.0 / (n_in + n_out) as f64).sqrt(),
        };
        let weights = (0..n_in * n_out)
            .map(|_| rng.gen_range(-bound..bound))
            .collect();
        Self {
            weights,
            bias: vec![0.0; n_out],
            n_in,
            n_out,
        }
    }

    /// Compute `W x + b`.
    pub(crate) fn forward(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .chunks_exact(self.n_in)
            .zip(&self.bias)
            .map(|(row, &b)| b + row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>())
            .collect()
    }

    /// Accumulate `dL/dW` and `dL/db` for one sample into `grad` and return
    /// `dL/dx`.
    pub(crate) fn backward(&self, input: &[f64], delta: &[f64], grad: &mut DenseGrad) -> Vec<f64> {
        let mut input_grad = vec![0.0; self.n_in];
        for (o, &d) in delta.iter().enumerate() {
            if d == 0.0 {
                continue;
            }
            grad.bias[o] += d;
            let row = &self.weights[o * self.n_in..(o + 1) * self.n_in];
            let grad_row = &mut grad.weights[o * self.n_in..(o + 1) * self.n_in];
            for i in 0..self.n_in {
                grad_row[i] += d * input[i];
                input_grad[i] += d * row[i];
            }
        }
        input_grad
    }
}

/// Gradient buffers shaped like a [`Dense`] layer.
#[derive(Debug, Clone)]
pub(crate) struct DenseGrad {
    pub(crate) weights: Vec<f64>,
    pub(crate) bias: Vec<f64>,
}

impl DenseGrad {
    pub(crate) fn zeros_like(layer: &Dense) -> Self {
        Self {
            weights: vec![0.0; layer.weights.len()],
            bias: vec![0.0; layer.bias.len()],
        }
    }

    pub(crate) fn clear(&mut self) {
        self.weights.fill(0.0);
        self.bias.fill(0.0);
    }

    pub(crate) fn scale(&mut self, factor: f64) {
        self.weights.iter_mut().for_each(|g| *g *= factor);
        self.bias.iter_mut().for_each(|g| *g *= factor);
    }
}

//! Adam optimizer (Kingma & Ba, 2015).

/// Adam hyperparameters and the shared timestep.
///
/// Moment estimates live in [`Moments`], one per parameter buffer.
#[derive(Debug, Clone)]
pub(crate) struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    eps: f64,
    t: i32,
}

/// First and second moment estimates for one parameter buffer.
#[derive(Debug, Clone)]
pub(crate) struct Moments {
    m: Vec<f64>,
    v: Vec<f64>,
}

impl Moments {
    pub(crate) fn zeros(len: usize) -> Self {
        Self {
            m: vec![0.0; len],
            v: vec![0.0; len],
        }
    }
}

impl Adam {
    /// Adam with beta1 = 0.9, beta2 = 0.999, eps = 1e-7.
    pub(crate) fn new(learning_rate: f64) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-7,
            t: 0,
        }
    }

    /// Advance the timestep. Call once per mini-batch, before `update`.
    pub(crate) fn tick(&mut self) {
        self.t = self.t.saturating_add(1);
    }

    /// Apply one bias-corrected Adam step to `params`.
    pub(crate) fn update(&self, params: &mut [f64], grads: &[f64], moments: &mut Moments) {
        let correction1 = 1.0 - self.beta1.powi(self.t);
        let correction2 = 1.0 - self.beta2.powi(self.t);
        for (((p, &g), m), v) in params
            .iter_mut()
            .zip(grads)
            .zip(&mut moments.m)
            .zip(&mut moments.v)
        {
            *m = self.beta1 * *m + (1.0 - self.beta1) * g;
            *v = self.beta2 * *v + (1.0 - self.beta2) * g * g;
            let m_hat = *m / correction1;
            let v_hat = *v / correction2;
            *p -= self.learning_rate * m_hat / (v_hat.sqrt() + self.eps);
        }
    }
}

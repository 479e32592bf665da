// ============================================================
// Layer 5 — Gated Recurrent Encoder
// ============================================================
// Folds an embedded sequence [batch, seq_len, d_input] into its
// final hidden state [batch, d_hidden], left to right.
//
// Per step (reset gate applied after the recurrent projection):
//   z  = σ(x·Wz + bz + h·Uz + cz)            update gate
//   r  = σ(x·Wr + br + h·Ur + cr)            reset gate
//   h~ = tanh(x·Wh + bh + r ⊙ (h·Uh + ch))   candidate
//   h' = z ⊙ h + (1 − z) ⊙ h~
//
// Dropout:
//   `dropout` masks input features, `recurrent_dropout` masks the
//   previous state before its projection. One mask is drawn per
//   sequence and reused at every step. Masks only exist when the
//   backend tracks gradients, so inference is deterministic.
//
// Reference: Cho et al. (2014) GRU
//            Gal & Ghahramani (2016) variational RNN dropout

use burn::{
    nn::{Linear, LinearConfig},
    prelude::*,
    tensor::{
        activation::{sigmoid, tanh},
        Distribution,
    },
};

#[derive(Config, Debug)]
pub struct GruEncoderConfig {
    pub d_input:  usize,
    pub d_hidden: usize,
    #[config(default = 0.0)]
    pub dropout: f64,
    #[config(default = 0.0)]
    pub recurrent_dropout: f64,
}

impl GruEncoderConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> GruEncoder<B> {
        // The three gates are packed side by side: [z | r | h~]
        let input_proj     = LinearConfig::new(self.d_input,  3 * self.d_hidden).init(device);
        let recurrent_proj = LinearConfig::new(self.d_hidden, 3 * self.d_hidden).init(device);
        GruEncoder {
            input_proj,
            recurrent_proj,
            d_hidden:          self.d_hidden,
            dropout:           self.dropout,
            recurrent_dropout: self.recurrent_dropout,
        }
    }
}

#[derive(Module, Debug)]
pub struct GruEncoder<B: Backend> {
    pub input_proj:     Linear<B>,
    pub recurrent_proj: Linear<B>,
    pub d_hidden:       usize,
    pub dropout:        f64,
    pub recurrent_dropout: f64,
}

impl<B: Backend> GruEncoder<B> {
    /// x: [batch, seq_len, d_input] → final state [batch, d_hidden]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch, seq_len, d_input] = x.dims();
        let device = x.device();
        let width  = 3 * self.d_hidden;

        let x = match dropout_mask::<B>([batch, d_input], self.dropout, &device) {
            Some(mask) => x * mask.unsqueeze_dim::<3>(1),
            None       => x,
        };
        // Input projections for every step at once: [batch, seq_len, 3H]
        let x_proj   = self.input_proj.forward(x);
        let rec_mask = dropout_mask::<B>([batch, self.d_hidden], self.recurrent_dropout, &device);

        let mut h = Tensor::<B, 2>::zeros([batch, self.d_hidden], &device);
        for t in 0..seq_len {
            let x_t = x_proj
                .clone()
                .slice([0..batch, t..t + 1, 0..width])
                .reshape([batch, width]);
            let h_in = match &rec_mask {
                Some(mask) => h.clone() * mask.clone(),
                None       => h.clone(),
            };
            let h_proj = self.recurrent_proj.forward(h_in);
            h = self.step(x_t, h_proj, h);
        }
        h
    }

    fn step(&self, x_t: Tensor<B, 2>, h_proj: Tensor<B, 2>, h_prev: Tensor<B, 2>) -> Tensor<B, 2> {
        let hidden = self.d_hidden;

        let z = sigmoid(gate(&x_t, 0, hidden) + gate(&h_proj, 0, hidden));
        let r = sigmoid(gate(&x_t, 1, hidden) + gate(&h_proj, 1, hidden));
        let candidate = tanh(gate(&x_t, 2, hidden) + r * gate(&h_proj, 2, hidden));

        z.clone() * h_prev + (z.neg() + 1.0) * candidate
    }
}

/// Columns `[index·hidden, (index+1)·hidden)` of a packed gate tensor.
fn gate<B: Backend>(packed: &Tensor<B, 2>, index: usize, hidden: usize) -> Tensor<B, 2> {
    let [batch, _] = packed.dims();
    packed.clone().slice([0..batch, index * hidden..(index + 1) * hidden])
}

/// Inverted-dropout keep mask, or `None` outside training.
fn dropout_mask<B: Backend>(
    shape:  [usize; 2],
    prob:   f64,
    device: &B::Device,
) -> Option<Tensor<B, 2>> {
    if !B::ad_enabled() || prob == 0.0 {
        return None;
    }
    let keep = 1.0 - prob;
    Some(Tensor::<B, 2>::random(shape, Distribution::Bernoulli(keep), device) / keep)
}

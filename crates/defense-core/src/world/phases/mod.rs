mod activation;
mod herbivory;
mod sampler;

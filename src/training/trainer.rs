//! Ensemble training loop
//!
//! Each member is a `LogisticHead` fitted with full-batch SGD on a bootstrap
//! draw of the training split. Class weights are balanced so the minority
//! (injured) class is not drowned out.

use burn::backend::{Autodiff, NdArray};
use burn::data::dataloader::batcher::Batcher;
use burn::optim::{GradientsParams, Optimizer, SgdConfig};
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::{ElementConversion, Tensor};
use rand::SeedableRng;

use crate::data::{
    generate_training_data, FeatureNormalization, InjuryBatch, InjuryBatcher, InjuryDataset,
    InjurySample,
};
use crate::features::FeatureVector;
use crate::model::{Classifier, EnsembleClassifier, LogisticHead, LogisticMember};
use crate::training::metrics::{Metrics, TrainingHistory};
use crate::{InjuryError, Result, TrainingConfig};

/// Summary of an offline training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// Accuracy on the held-out split
    pub accuracy: f64,
    pub features: Vec<String>,
    pub training_samples: usize,
    pub test_samples: usize,
    /// Final training loss of each member
    pub member_losses: Vec<f64>,
    pub test_metrics: Metrics,
}

/// Trainer for the bagged logistic ensemble
pub struct EnsembleTrainer<B: AutodiffBackend> {
    config: TrainingConfig,
    device: B::Device,
}

impl<B: AutodiffBackend> EnsembleTrainer<B> {
    /// Create a new trainer
    pub fn new(config: TrainingConfig, device: B::Device) -> Self {
        EnsembleTrainer { config, device }
    }

    /// Fit every member and assemble the classifier
    pub fn fit(&self, train: &InjuryDataset) -> Result<(EnsembleClassifier, Vec<TrainingHistory>)> {
        if train.is_empty() {
            return Err(InjuryError::Training("training split is empty".to_string()));
        }
        let positives = train.positive_count();
        if positives == 0 || positives == train.samples().len() {
            return Err(InjuryError::Training(
                "training split contains a single class".to_string(),
            ));
        }
        if self.config.estimators == 0 {
            return Err(InjuryError::Training(
                "at least one estimator is required".to_string(),
            ));
        }

        let normalization = FeatureNormalization::from_samples(train.samples());
        log::debug!(
            "Feature normalization: mean={:?}, std={:?}",
            normalization.mean,
            normalization.std
        );

        let mut rng = rand::rngs::StdRng::seed_from_u64(self.config.seed);
        let mut members = Vec::with_capacity(self.config.estimators);
        let mut histories = Vec::with_capacity(self.config.estimators);

        for index in 0..self.config.estimators {
            let draw = train.bootstrap(&mut rng);
            let (member, history) = self.train_member(index, &draw, &normalization)?;
            members.push(member);
            histories.push(history);
        }

        Ok((EnsembleClassifier::new(normalization, members), histories))
    }

    /// Train one member on a bootstrap draw
    fn train_member(
        &self,
        index: usize,
        data: &InjuryDataset,
        normalization: &FeatureNormalization,
    ) -> Result<(LogisticMember, TrainingHistory)> {
        let batcher = InjuryBatcher::new(normalization.clone());
        let batch = <InjuryBatcher as Batcher<B, InjurySample, InjuryBatch<B>>>::batch(
            &batcher,
            data.samples().to_vec(),
            &self.device,
        );

        // Balanced class weights: n / (2 * class_count)
        let n = data.samples().len() as f32;
        let positives = data.positive_count().max(1) as f32;
        let negatives = (data.samples().len() - data.positive_count()).max(1) as f32;
        let pos_weight = n / (2.0 * positives);
        let neg_weight = n / (2.0 * negatives);

        let mut model = LogisticHead::<B>::new(&self.device);
        let mut optimizer = SgdConfig::new().init::<B, LogisticHead<B>>();
        let mut history = TrainingHistory::new();

        let epochs = self.config.epochs;
        for epoch in 0..epochs {
            let probs = model.forward_probability(batch.features.clone());
            let loss = weighted_binary_cross_entropy(
                probs,
                batch.targets.clone(),
                pos_weight,
                neg_weight,
            );
            let loss_val: f32 = loss.clone().into_scalar().elem();

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optimizer.step(self.config.learning_rate, model, grads);

            let mut metrics = Metrics::new();
            metrics.update_loss(loss_val);
            history.record_epoch(epoch, &metrics);

            if epoch % 50 == 0 || epoch + 1 == epochs {
                log::debug!(
                    "Member {} epoch {}/{}: loss={:.4}",
                    index + 1,
                    epoch + 1,
                    epochs,
                    loss_val
                );
            }
        }

        let (weights, bias) = model.parameters()?;
        if weights.iter().any(|w| !w.is_finite()) || !bias.is_finite() {
            return Err(InjuryError::Training(format!(
                "member {} diverged; lower the learning rate",
                index + 1
            )));
        }

        log::info!(
            "Trained member {}/{} (final loss {:.4})",
            index + 1,
            self.config.estimators,
            history.final_loss().unwrap_or(f64::NAN)
        );

        Ok((LogisticMember { weights, bias }, history))
    }
}

/// Class-weighted binary cross-entropy on probabilities
fn weighted_binary_cross_entropy<B: AutodiffBackend>(
    probs: Tensor<B, 2>,
    targets: Tensor<B, 2>,
    pos_weight: f32,
    neg_weight: f32,
) -> Tensor<B, 1> {
    let eps = 1e-7;
    let probs_clamped = probs.clamp(eps, 1.0 - eps);
    let weights = targets.clone() * (pos_weight - neg_weight) + neg_weight;
    let loss = targets.clone().neg() * probs_clamped.clone().log()
        - (targets.neg() + 1.0) * (probs_clamped.neg() + 1.0).log();
    (loss * weights).mean()
}

/// Score a classifier on labelled data (probability >= 0.5 counts as injured)
pub fn evaluate<C: Classifier + ?Sized>(classifier: &C, dataset: &InjuryDataset) -> Result<Metrics> {
    let mut metrics = Metrics::new();
    for sample in dataset.samples() {
        let probability = classifier.predict_probability(&sample.features)?;
        metrics.record(probability >= 0.5, sample.injured);
    }
    Ok(metrics)
}

/// Split a labelled dataset, train the ensemble and measure held-out accuracy
pub fn train_classifier(
    dataset: &InjuryDataset,
    config: &TrainingConfig,
) -> Result<(EnsembleClassifier, TrainingReport)> {
    type TrainBackend = Autodiff<NdArray<f32>>;

    let (train, test) = dataset.stratified_split(config.test_fraction, config.seed)?;
    log::info!(
        "Split into {} training and {} test samples ({} injured overall)",
        train.samples().len(),
        test.samples().len(),
        dataset.positive_count()
    );

    let device = Default::default();
    let trainer = EnsembleTrainer::<TrainBackend>::new(config.clone(), device);

    log::info!("Training ensemble with {} members...", config.estimators);
    let (classifier, histories) = trainer.fit(&train)?;

    let test_metrics = if test.is_empty() {
        evaluate(&classifier, &train)?
    } else {
        evaluate(&classifier, &test)?
    };
    let accuracy = test_metrics.accuracy();
    log::info!("Held-out evaluation: {}", test_metrics);

    let report = TrainingReport {
        accuracy,
        features: FeatureVector::names(),
        training_samples: train.samples().len(),
        test_samples: test.samples().len(),
        member_losses: histories
            .iter()
            .filter_map(|h| h.final_loss())
            .collect(),
        test_metrics,
    };

    Ok((classifier.with_accuracy(accuracy), report))
}

/// Train on `config.samples` synthetic players
pub fn train_synthetic(config: &TrainingConfig) -> Result<(EnsembleClassifier, TrainingReport)> {
    log::info!("Generating {} training samples...", config.samples);
    let dataset = generate_training_data(config.samples, config.seed)?;
    train_classifier(&dataset, config)
}

//! The inference backend: one forward pass per request, decoded into a
//! structured response.
//!
//! `NeuralBackend` is one member of a polymorphic backend family sharing a
//! common lifecycle contract; the [`ModelBackend`] trait is the seam the
//! serving layer dispatches through. Initialization loads the model,
//! classifies its topology once and configures the execution session;
//! `predict` runs synchronously and either fully decodes or fails the
//! request as a whole.

use crate::core::config::BackendConfig;
use crate::core::errors::{BackendError, BackendResult};
use crate::core::inference::{InferenceNetwork, Tensor2D, run_forward};
use crate::core::session::ExecutionSession;
use crate::core::task::TaskType;
use crate::domain::{PredictRequest, PredictResponse, PredictionResult};
use crate::model::{LabelTable, ModelFiles};
use crate::processors::{BBox, decode_classification, decode_detections, decode_sequence};
use std::sync::Arc;

/// Common prediction contract of the backend family.
pub trait ModelBackend {
    /// Returns the task type cached at initialization.
    fn task_type(&self) -> TaskType;

    /// Runs one forward pass and decodes the result.
    fn predict(&self, request: &PredictRequest) -> BackendResult<PredictResponse>;
}

/// Backend wrapping one loaded network of an external inference engine.
pub struct NeuralBackend<N: InferenceNetwork> {
    net: N,
    session: Arc<ExecutionSession>,
    task: TaskType,
    labels: LabelTable,
    nclasses: usize,
}

impl<N: InferenceNetwork> std::fmt::Debug for NeuralBackend<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NeuralBackend")
            .field("task", &self.task)
            .field("nclasses", &self.nclasses)
            .field("threads", &self.session.threads())
            .finish()
    }
}

impl<N: InferenceNetwork> NeuralBackend<N> {
    /// Initializes the backend: loads topology and weights into the
    /// engine, classifies the topology, loads the label table and
    /// configures the execution session.
    ///
    /// Any failure here is fatal; the backend is unusable and the error
    /// is an [`BackendError::Initialization`].
    pub fn init(mut net: N, model: &ModelFiles, config: &BackendConfig) -> BackendResult<Self> {
        net.load_topology(&model.topology).map_err(|e| {
            BackendError::initialization_with_source(
                format!("failed to load topology '{}'", model.topology.display()),
                e,
            )
        })?;
        net.load_weights(&model.weights).map_err(|e| {
            BackendError::initialization_with_source(
                format!("failed to load weights '{}'", model.weights.display()),
                e,
            )
        })?;

        let task = TaskType::from_topology_file(&model.topology)?;
        let labels = match &model.corresp {
            Some(path) => LabelTable::from_file(path)?,
            None => LabelTable::empty(),
        };
        let nclasses = config.nclasses.unwrap_or_else(|| labels.len());
        let session = ExecutionSession::for_scope(config);

        tracing::info!(
            task = task.name(),
            nclasses,
            threads = session.threads(),
            topology = %model.topology.display(),
            "backend initialized"
        );
        Ok(Self {
            net,
            session,
            task,
            labels,
            nclasses,
        })
    }

    /// Returns the label table loaded from the correspondence file.
    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    /// Returns the execution session shared by all calls on this backend.
    pub fn session(&self) -> &ExecutionSession {
        &self.session
    }

    fn validate_request(&self, request: &PredictRequest) -> BackendResult<()> {
        request.output.validate()?;
        if request.ids.is_empty() {
            return Err(BackendError::invalid_input(
                "request carries no identifiers",
            ));
        }
        // The task type cached at initialization is authoritative; request
        // flags that contradict it are ignored.
        if request.output.bbox && self.task != TaskType::Detection {
            tracing::warn!(
                task = self.task.name(),
                "request asked for bounding boxes on a non-detection model; ignoring"
            );
        }
        if request.output.ctc && self.task != TaskType::SequenceCtc {
            tracing::warn!(
                task = self.task.name(),
                "request asked for CTC decoding on a non-sequence model; ignoring"
            );
        }
        Ok(())
    }

    fn decode(
        &self,
        output: &Tensor2D,
        request: &PredictRequest,
    ) -> BackendResult<(Vec<f32>, Vec<String>, Option<Vec<BBox>>)> {
        let opts = &request.output;
        match self.task {
            TaskType::Classification => {
                if output.nrows() == 0 {
                    return Err(BackendError::invalid_input("empty classification output"));
                }
                let entries =
                    decode_classification(output.row(0), opts.best, opts.confidence_threshold);
                let probs = entries.iter().map(|e| e.score).collect();
                let cats = entries
                    .iter()
                    .map(|e| self.labels.label_or_index(e.index))
                    .collect();
                Ok((probs, cats, None))
            }
            TaskType::Detection => {
                let image_size = request.image_sizes.first().copied().ok_or_else(|| {
                    BackendError::invalid_input(
                        "detection request carries no original image size",
                    )
                })?;
                let detections =
                    decode_detections(output.view(), opts.confidence_threshold, image_size)?;
                let probs = detections.iter().map(|d| d.score).collect();
                let cats = detections
                    .iter()
                    .map(|d| self.labels.label_or_index(d.class_index))
                    .collect();
                let bboxes = detections.into_iter().map(|d| d.bbox).collect();
                Ok((probs, cats, Some(bboxes)))
            }
            TaskType::SequenceCtc => {
                let sequence = decode_sequence(output.view(), opts.blank_label);
                let text = sequence
                    .iter()
                    .map(|&label| self.labels.character_for(label))
                    .collect::<BackendResult<String>>()?;
                // Sequence decoding does not average timestep confidences.
                Ok((vec![1.0], vec![text], None))
            }
        }
    }

    fn assemble(
        &self,
        uri: String,
        probs: Vec<f32>,
        cats: Vec<String>,
        bboxes: Option<Vec<BBox>>,
    ) -> PredictResponse {
        PredictResponse {
            results: vec![PredictionResult {
                uri,
                loss: 0.0,
                probs,
                cats,
                bboxes,
            }],
            nclasses: self.nclasses,
            bbox: self.task == TaskType::Detection,
            roi: false,
            multibox_rois: false,
            status: 0,
        }
    }
}

impl<N: InferenceNetwork> ModelBackend for NeuralBackend<N> {
    fn task_type(&self) -> TaskType {
        self.task
    }

    fn predict(&self, request: &PredictRequest) -> BackendResult<PredictResponse> {
        self.validate_request(request)?;
        let output = run_forward(&self.net, &self.session, self.task, &request.input)?;
        let (probs, cats, bboxes) = self.decode(&output, request)?;
        tracing::debug!(
            task = self.task.name(),
            uri = %request.ids[0],
            results = probs.len(),
            "decoded prediction"
        );
        Ok(self.assemble(request.ids[0].clone(), probs, cats, bboxes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::OutputConfig;
    use crate::core::inference::fake::FakeNetwork;
    use ndarray::{ArrayD, IxDyn, array};
    use std::io::Write;

    fn topology_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    fn corresp_file(lines: &[(usize, &str)]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for (index, label) in lines {
            writeln!(file, "{} {}", index, label).unwrap();
        }
        file
    }

    fn input() -> ArrayD<f32> {
        ArrayD::zeros(IxDyn(&[1, 3, 8, 8]))
    }

    fn model_files(
        topology: &tempfile::NamedTempFile,
        corresp: Option<&tempfile::NamedTempFile>,
    ) -> ModelFiles {
        let files = ModelFiles::new(topology.path(), topology.path());
        match corresp {
            Some(c) => files.with_corresp(c.path()),
            None => files,
        }
    }

    #[test]
    fn test_classification_predict() {
        let topology = topology_file("Input data\nSoftmax prob\n");
        let corresp = corresp_file(&[(0, "ant"), (1, "bee"), (2, "cat")]);
        let net = FakeNetwork::new().with_output("prob", array![[0.1, 0.9, 0.4]]);
        let backend = NeuralBackend::init(
            net,
            &model_files(&topology, Some(&corresp)),
            &BackendConfig::new().with_threads(1),
        )
        .unwrap();
        assert_eq!(backend.task_type(), TaskType::Classification);

        let request = PredictRequest::new("img-1", input()).with_output(
            OutputConfig::new()
                .with_best(2)
                .with_confidence_threshold(0.3),
        );
        let response = backend.predict(&request).unwrap();
        let result = &response.results[0];
        assert_eq!(result.uri, "img-1");
        assert_eq!(result.loss, 0.0);
        assert_eq!(result.probs, vec![0.9, 0.4]);
        assert_eq!(result.cats, vec!["bee", "cat"]);
        assert!(result.bboxes.is_none());
        assert_eq!(response.nclasses, 3);
        assert!(!response.bbox);
        assert!(!response.roi);
        assert!(!response.multibox_rois);
        assert_eq!(response.status, 0);
    }

    #[test]
    fn test_detection_predict() {
        let topology = topology_file("Input data\nDetectionOutput detection_out\n");
        let corresp = corresp_file(&[(0, "background"), (1, "person"), (2, "car")]);
        let net = FakeNetwork::new().with_output(
            "detection_out",
            array![
                [1.0, 0.95, 0.10, 0.80, 0.50, 0.20],
                [2.0, 0.20, 0.00, 1.00, 1.00, 0.00],
            ],
        );
        let backend = NeuralBackend::init(
            net,
            &model_files(&topology, Some(&corresp)),
            &BackendConfig::new().with_threads(1).with_nclasses(3),
        )
        .unwrap();
        assert_eq!(backend.task_type(), TaskType::Detection);

        let request = PredictRequest::new("img-2", input())
            .with_image_size(480, 640)
            .with_output(
                OutputConfig::new()
                    .with_bbox(true)
                    .with_confidence_threshold(0.5),
            );
        let response = backend.predict(&request).unwrap();
        let result = &response.results[0];
        assert_eq!(result.cats, vec!["person"]);
        assert_eq!(result.probs, vec![0.95]);
        let boxes = result.bboxes.as_ref().unwrap();
        assert_eq!(boxes.len(), 1);
        assert_eq!(boxes[0].xmin, 0.10 * 640.0);
        assert_eq!(boxes[0].ymax, 0.80 * 480.0);
        assert_eq!(boxes[0].xmax, 0.50 * 640.0);
        assert_eq!(boxes[0].ymin, 0.20 * 480.0);
        assert!(response.bbox);
    }

    #[test]
    fn test_detection_requires_image_size() {
        let topology = topology_file("DetectionOutput detection_out\n");
        let net = FakeNetwork::new()
            .with_output("detection_out", array![[1.0, 0.9, 0.1, 0.2, 0.3, 0.4]]);
        let backend = NeuralBackend::init(
            net,
            &model_files(&topology, None),
            &BackendConfig::new().with_threads(1),
        )
        .unwrap();

        let request = PredictRequest::new("img", input());
        assert!(matches!(
            backend.predict(&request),
            Err(BackendError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_ctc_predict() {
        let topology = topology_file("ContinuationIndicator cont\nLSTM lstm\n");
        // Index 0 is the blank; 1 and 2 carry character codes for 'h', 'i'.
        let corresp = corresp_file(&[(0, "0"), (1, "104"), (2, "105")]);
        // Argmax path [0, 1, 1, 0, 2] collapses to [1, 2] = "hi".
        let net = FakeNetwork::new().with_output(
            "probs",
            array![
                [0.8, 0.1, 0.1],
                [0.1, 0.8, 0.1],
                [0.2, 0.7, 0.1],
                [0.9, 0.05, 0.05],
                [0.1, 0.2, 0.7],
            ],
        );
        let backend = NeuralBackend::init(
            net,
            &model_files(&topology, Some(&corresp)),
            &BackendConfig::new().with_threads(1),
        )
        .unwrap();
        assert_eq!(backend.task_type(), TaskType::SequenceCtc);

        let request = PredictRequest::new("line-7", input())
            .with_output(OutputConfig::new().with_ctc(true).with_blank_label(0));
        let response = backend.predict(&request).unwrap();
        let result = &response.results[0];
        assert_eq!(result.cats, vec!["hi"]);
        assert_eq!(result.probs, vec![1.0]);
        assert!(!response.bbox);
    }

    #[test]
    fn test_engine_fault_fails_request() {
        let topology = topology_file("Softmax prob\n");
        let backend = NeuralBackend::init(
            FakeNetwork::failing(),
            &model_files(&topology, None),
            &BackendConfig::new().with_threads(1),
        )
        .unwrap();
        let err = backend.predict(&PredictRequest::new("img", input())).unwrap_err();
        assert!(matches!(err, BackendError::InferenceEngine { .. }));
    }

    #[test]
    fn test_empty_id_list_rejected() {
        let topology = topology_file("Softmax prob\n");
        let net = FakeNetwork::new().with_output("prob", array![[1.0]]);
        let backend = NeuralBackend::init(
            net,
            &model_files(&topology, None),
            &BackendConfig::new().with_threads(1),
        )
        .unwrap();
        let mut request = PredictRequest::new("img", input());
        request.ids.clear();
        assert!(matches!(
            backend.predict(&request),
            Err(BackendError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_mismatched_flags_are_ignored() {
        // A bbox request against a classification topology still decodes
        // as classification; the cached task type is authoritative.
        let topology = topology_file("Softmax prob\n");
        let net = FakeNetwork::new().with_output("prob", array![[0.2, 0.8]]);
        let backend = NeuralBackend::init(
            net,
            &model_files(&topology, None),
            &BackendConfig::new().with_threads(1),
        )
        .unwrap();
        let request =
            PredictRequest::new("img", input()).with_output(OutputConfig::new().with_bbox(true));
        let response = backend.predict(&request).unwrap();
        assert!(response.results[0].bboxes.is_none());
        assert!(!response.bbox);
    }

    #[test]
    fn test_nclasses_falls_back_to_label_table() {
        let topology = topology_file("Softmax prob\n");
        let corresp = corresp_file(&[(0, "a"), (1, "b"), (2, "c"), (3, "d")]);
        let net = FakeNetwork::new().with_output("prob", array![[0.4, 0.3, 0.2, 0.1]]);
        let backend = NeuralBackend::init(
            net,
            &model_files(&topology, Some(&corresp)),
            &BackendConfig::new().with_threads(1),
        )
        .unwrap();
        let response = backend.predict(&PredictRequest::new("img", input())).unwrap();
        assert_eq!(response.nclasses, 4);
    }

    #[test]
    fn test_unlabeled_class_falls_back_to_index() {
        let topology = topology_file("Softmax prob\n");
        let net = FakeNetwork::new().with_output("prob", array![[0.1, 0.9]]);
        let backend = NeuralBackend::init(
            net,
            &model_files(&topology, None),
            &BackendConfig::new().with_threads(1),
        )
        .unwrap();
        let response = backend.predict(&PredictRequest::new("img", input())).unwrap();
        assert_eq!(response.results[0].cats, vec!["1"]);
    }
}

use crate::config::DiffConfig;
use crate::error::DiffError;
use crate::pipeline::defaults::{DpSequenceAligner, ToleranceComparator};
use crate::pipeline::runtime::{PerformanceDiffer, PerformanceDifferParts};
use crate::pipeline::traits::{AttributeComparator, SequenceAligner};

pub struct PerformanceDifferBuilder {
    config: DiffConfig,
    sequence_aligner: Option<Box<dyn SequenceAligner>>,
    attribute_comparator: Option<Box<dyn AttributeComparator>>,
}

impl PerformanceDifferBuilder {
    pub fn new(config: DiffConfig) -> Self {
        Self {
            config,
            sequence_aligner: None,
            attribute_comparator: None,
        }
    }

    pub fn with_sequence_aligner(mut self, sequence_aligner: Box<dyn SequenceAligner>) -> Self {
        self.sequence_aligner = Some(sequence_aligner);
        self
    }

    pub fn with_attribute_comparator(
        mut self,
        attribute_comparator: Box<dyn AttributeComparator>,
    ) -> Self {
        self.attribute_comparator = Some(attribute_comparator);
        self
    }

    pub fn build(self) -> Result<PerformanceDiffer, DiffError> {
        self.config.validate()?;

        let attribute_comparator = match self.attribute_comparator {
            Some(comparator) => comparator,
            None => Box::new(ToleranceComparator::new(
                self.config.tolerances.clone(),
                self.config.priority.clone(),
            )),
        };

        Ok(PerformanceDiffer::from_parts(PerformanceDifferParts {
            config: self.config,
            sequence_aligner: self
                .sequence_aligner
                .unwrap_or_else(|| Box::new(DpSequenceAligner)),
            attribute_comparator,
        }))
    }
}

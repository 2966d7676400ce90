use crate::application::retriever::RetrieverFactory;
use crate::domain::error::DomainError;
use crate::domain::ports::index_store::StoreInfo;
use crate::domain::values::collection::Collection;

pub struct InspectUseCase {
    factory: RetrieverFactory,
}

impl InspectUseCase {
    pub fn new(factory: RetrieverFactory) -> Self {
        Self { factory }
    }

    pub fn execute(&self, collection: Collection) -> Result<StoreInfo, DomainError> {
        let location = self.factory.location(collection);
        self.factory.store().inspect(&location)
    }
}

//! Contrato de repositorio y su implementación en memoria.
//!
//! Sustituye a las listas mock globales: cada host recibe sus repositorios
//! inyectados y los datos viven lo que vive el proceso.
use log::debug;
use portal_domain::Record;
use uuid::Uuid;

use crate::error::StoreError;

/// Colección de registros de un tipo. Object-safe para poder inyectar
/// `Box<dyn Repository<T>>`.
pub trait Repository<T: Record>: Send {
    /// Copia de todos los registros en orden de inserción.
    fn list(&self) -> Vec<T>;
    fn add(&mut self, record: T) -> Result<(), StoreError>;
    fn get(&self, id: Uuid) -> Option<T>;
    fn find_by_reference(&self, reference: &str) -> Option<T>;
    /// Aplica `update` al registro `id` y devuelve la versión actualizada.
    fn update_by_id(&mut self, id: Uuid, update: &mut dyn FnMut(&mut T)) -> Result<T, StoreError>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryRepository<T> {
    items: Vec<T>,
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Repository<T> for InMemoryRepository<T> {
    fn list(&self) -> Vec<T> {
        self.items.clone()
    }

    fn add(&mut self, record: T) -> Result<(), StoreError> {
        if self.items.iter().any(|r| r.id() == record.id() || r.reference() == record.reference()) {
            return Err(StoreError::Duplicate(record.reference().to_string()));
        }
        debug!("repository add {} ({})", record.reference(), record.id());
        self.items.push(record);
        Ok(())
    }

    fn get(&self, id: Uuid) -> Option<T> {
        self.items.iter().find(|r| r.id() == id).cloned()
    }

    fn find_by_reference(&self, reference: &str) -> Option<T> {
        self.items.iter().find(|r| r.reference() == reference).cloned()
    }

    fn update_by_id(&mut self, id: Uuid, update: &mut dyn FnMut(&mut T)) -> Result<T, StoreError> {
        let record = self.items
                         .iter_mut()
                         .find(|r| r.id() == id)
                         .ok_or(StoreError::NotFound(id))?;
        update(record);
        Ok(record.clone())
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

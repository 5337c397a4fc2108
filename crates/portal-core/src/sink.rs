//! Contrato del destino de una submission.
//!
//! El sink recibe el snapshot validado del paso terminal y ejecuta el efecto
//! real (crear un ticket, agregar un pedido...). Si devuelve error el engine
//! permanece en el paso terminal y el usuario puede reintentar.
use crate::errors::SinkError;
use crate::model::FlowSnapshot;

pub trait SubmissionSink {
    type Receipt;

    fn accept(&mut self, snapshot: &FlowSnapshot) -> Result<Self::Receipt, SinkError>;
}

/// Adaptador para usar un closure como sink.
pub struct FnSink<F>(pub F);

impl<F, R> SubmissionSink for FnSink<F> where F: FnMut(&FlowSnapshot) -> Result<R, SinkError>
{
    type Receipt = R;

    fn accept(&mut self, snapshot: &FlowSnapshot) -> Result<R, SinkError> {
        (self.0)(snapshot)
    }
}

//! Registros mock iniciales (historial del cliente de demostración).
use chrono::NaiveDate;
use log::{debug, warn};
use portal_domain::catalog::find_product;
use portal_domain::payload::{OrderPayload, Priority, RelocationPayload, TicketCategory, TicketPayload};
use portal_domain::records::{RequestDetails, TicketStatus};
use portal_domain::{Order, ServiceRequest, Ticket};

use crate::store::PortalStore;

/// Siembra tickets, un pedido y una solicitud. Las referencias salen del
/// generador del store, así las nuevas continúan la numeración.
pub fn seed(store: &mut PortalStore) {
    let mut resolved = Ticket::open(store.references().next::<Ticket>(),
                                    TicketPayload { category: TicketCategory::Billing,
                                                    subject: "Duplicated charge in August".into(),
                                                    description: "The August invoice was charged twice.".into(),
                                                    priority: Priority::Medium });
    resolved.set_status(TicketStatus::Resolved);
    let open = Ticket::open(store.references().next::<Ticket>(),
                            TicketPayload { category: TicketCategory::Tv,
                                            subject: "Channels missing".into(),
                                            description: "Sports pack channels show no signal.".into(),
                                            priority: Priority::Low });
    let results = [store.tickets.add(resolved), store.tickets.add(open)];

    let order = find_product("mesh-node").map(|product| {
                                             let payload = OrderPayload { product: product.id.clone(),
                                                                          quantity: 2,
                                                                          delivery_address: "Calle Mayor 1, Madrid".into(),
                                                                          contact_phone: "600111222".into() };
                                             Order::place(store.references().next::<Order>(), product, payload)
                                         });
    let order_result = order.map(|o| store.orders.add(o));

    let request = NaiveDate::from_ymd_opt(2026, 11, 15).map(|move_date| {
                      let details = RequestDetails::Relocation(RelocationPayload { new_address: "Av. de la Paz 40, Valencia".into(),
                                                                                   move_date,
                                                                                   keep_number: true });
                      ServiceRequest::new(store.references().next::<ServiceRequest>(), details)
                  });
    let request_result = request.map(|r| store.requests.add(r));

    for err in results.into_iter()
                      .chain(order_result)
                      .chain(request_result)
                      .filter_map(Result::err)
    {
        warn!("seed record skipped: {err}");
    }
    debug!("mock data seeded: {} tickets, {} orders, {} requests",
           store.tickets.len(),
           store.orders.len(),
           store.requests.len());
}
